//! SIUL2 pin controller.
//!
//! Models pad configuration (MSCR), GPIO data output/input slots and the
//! external interrupt block (DISR0/DIRER0/IREER0/IFEER0). Edges on pins with
//! a bit in the 32-bit interrupt words latch into DISR0 and assert one
//! level-triggered interrupt line that stays high until software clears
//! every pending bit.

use std::fmt;

use bitflags::bitflags;

use crate::access::SIUL2_ACCESS;
use crate::signal::{IrqHandler, IrqLine, PinDriver};
use crate::{AccessDiagnostics, AccessFault, MmioDevice};

/// Number of pads modeled by the controller.
pub const SIUL2_PIN_COUNT: usize = 144;
/// Size of the register window in bytes.
pub const SIUL2_WINDOW_SIZE: u32 = 0x4000;

/// MCU ID register 1 offset.
pub const SIUL2_MIDR1: u32 = 0x0004;
/// MCU ID register 2 offset.
pub const SIUL2_MIDR2: u32 = 0x0008;
/// Interrupt status register offset (write-1-to-clear).
pub const SIUL2_DISR0: u32 = 0x0010;
/// Interrupt request enable register offset.
pub const SIUL2_DIRER0: u32 = 0x0018;
/// Interrupt request select register offset.
pub const SIUL2_DIRSR0: u32 = 0x001C;
/// Rising-edge event enable register offset.
pub const SIUL2_IREER0: u32 = 0x0020;
/// Falling-edge event enable register offset.
pub const SIUL2_IFEER0: u32 = 0x0024;
/// Interrupt filter enable register offset.
pub const SIUL2_IFER0: u32 = 0x0028;
/// First pad configuration slot; slot `n` sits at `MSCR_BASE + 4 * n`.
pub const SIUL2_MSCR_BASE: u32 = 0x0240;
/// First output data slot; slot `n` sits at `GPDO_BASE + n`.
pub const SIUL2_GPDO_BASE: u32 = 0x1300;
/// First input data slot; slot `n` sits at `GPDI_BASE + n`.
pub const SIUL2_GPDI_BASE: u32 = 0x1500;

/// MIDR1 reset value identifying the S32K344.
pub const SIUL2_MIDR1_RESET: u32 = 0x5737_3001;
/// MIDR2 reset value.
pub const SIUL2_MIDR2_RESET: u32 = 0x0000_0000;

#[allow(clippy::cast_possible_truncation)]
const PIN_COUNT: u32 = SIUL2_PIN_COUNT as u32;

const _: () = assert!(SIUL2_MSCR_BASE + 4 * PIN_COUNT <= SIUL2_GPDO_BASE);
const _: () = assert!(SIUL2_GPDO_BASE + PIN_COUNT <= SIUL2_GPDI_BASE);
const _: () = assert!(SIUL2_GPDI_BASE + PIN_COUNT <= SIUL2_WINDOW_SIZE);

bitflags! {
    /// Pad configuration word (MSCR).
    ///
    /// Bits outside the named fields are stored and read back verbatim.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mscr: u32 {
        /// Source signal select field.
        const SSS = 0x7;
        /// Invert the pad value.
        const INV = 1 << 11;
        /// Pull select (set: pull-up).
        const PUS = 1 << 12;
        /// Pull enable.
        const PUE = 1 << 13;
        /// Slew rate control.
        const SRE = 1 << 14;
        /// Input buffer enable.
        const IBE = 1 << 19;
        /// Open drain enable.
        const ODE = 1 << 20;
        /// Output buffer enable.
        const OBE = 1 << 21;
    }
}

impl Mscr {
    /// Returns the source signal select field.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn source_signal(self) -> u8 {
        (self.bits() & Self::SSS.bits()) as u8
    }
}

/// Pad direction derived from the output buffer enable bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Output buffer disabled.
    #[default]
    Input,
    /// Output buffer enabled; GPDO writes reach the pin driver.
    Output,
}

/// Per-pad state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pad {
    mscr: Mscr,
    output_level: bool,
    input_level: bool,
    prev_input_level: bool,
}

impl Pad {
    const RESET: Self = Self {
        mscr: Mscr::empty(),
        output_level: false,
        input_level: false,
        prev_input_level: false,
    };

    /// Returns the raw configuration word.
    #[must_use]
    pub const fn mscr(&self) -> Mscr {
        self.mscr
    }

    /// Returns the pad direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.mscr.contains(Mscr::OBE) {
            Direction::Output
        } else {
            Direction::Input
        }
    }

    /// Returns `true` when external level changes are latched.
    #[must_use]
    pub const fn input_buffer_enabled(&self) -> bool {
        self.mscr.contains(Mscr::IBE)
    }

    /// Last level written by software through GPDO.
    #[must_use]
    pub const fn output_level(&self) -> bool {
        self.output_level
    }

    /// Last level latched from the external driver.
    #[must_use]
    pub const fn input_level(&self) -> bool {
        self.input_level
    }

    /// Level seen before the most recent latched input event.
    #[must_use]
    pub const fn prev_input_level(&self) -> bool {
        self.prev_input_level
    }
}

/// Construction-time identification values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Siul2Config {
    /// Value reported by MIDR1.
    pub midr1: u32,
    /// Value reported by MIDR2.
    pub midr2: u32,
}

impl Default for Siul2Config {
    fn default() -> Self {
        Self {
            midr1: SIUL2_MIDR1_RESET,
            midr2: SIUL2_MIDR2_RESET,
        }
    }
}

/// Snapshot of the controller's shared (non per-pin) registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Siul2Registers {
    /// MCU ID register 1.
    pub midr1: u32,
    /// MCU ID register 2.
    pub midr2: u32,
    /// Pending edge status, one bit per pin.
    pub disr0: u32,
    /// Interrupt request enable, one bit per pin.
    pub direr0: u32,
    /// Interrupt request select, stored only.
    pub dirsr0: u32,
    /// Rising-edge enable, one bit per pin.
    pub ireer0: u32,
    /// Falling-edge enable, one bit per pin.
    pub ifeer0: u32,
    /// Filter enable, stored only.
    pub ifer0: u32,
}

impl Siul2Registers {
    const fn reset(config: &Siul2Config) -> Self {
        Self {
            midr1: config.midr1,
            midr2: config.midr2,
            disr0: 0,
            direr0: 0,
            dirsr0: 0,
            ireer0: 0,
            ifeer0: 0,
            ifer0: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Siul2Reg {
    Midr1,
    Midr2,
    Disr0,
    Direr0,
    Dirsr0,
    Ireer0,
    Ifeer0,
    Ifer0,
    Mscr(usize),
    Gpdo(usize),
    Gpdi(usize),
}

fn decode(offset: u32) -> Option<Siul2Reg> {
    let reg = match offset {
        SIUL2_MIDR1 => Siul2Reg::Midr1,
        SIUL2_MIDR2 => Siul2Reg::Midr2,
        SIUL2_DISR0 => Siul2Reg::Disr0,
        SIUL2_DIRER0 => Siul2Reg::Direr0,
        SIUL2_DIRSR0 => Siul2Reg::Dirsr0,
        SIUL2_IREER0 => Siul2Reg::Ireer0,
        SIUL2_IFEER0 => Siul2Reg::Ifeer0,
        SIUL2_IFER0 => Siul2Reg::Ifer0,
        _ if (SIUL2_MSCR_BASE..SIUL2_MSCR_BASE + 4 * PIN_COUNT).contains(&offset) => {
            Siul2Reg::Mscr(pin_slot((offset - SIUL2_MSCR_BASE) / 4)?)
        }
        _ if (SIUL2_GPDO_BASE..SIUL2_GPDO_BASE + PIN_COUNT).contains(&offset) => {
            Siul2Reg::Gpdo(pin_slot(offset - SIUL2_GPDO_BASE)?)
        }
        _ if (SIUL2_GPDI_BASE..SIUL2_GPDI_BASE + PIN_COUNT).contains(&offset) => {
            Siul2Reg::Gpdi(pin_slot(offset - SIUL2_GPDI_BASE)?)
        }
        _ => return None,
    };
    Some(reg)
}

fn pin_slot(index: u32) -> Option<usize> {
    usize::try_from(index).ok()
}

/// Bit for `pin` in the 32-bit interrupt words; pins past 31 have none.
fn pin_bit(pin: usize) -> Option<u32> {
    u32::try_from(pin).ok().and_then(|pin| 1_u32.checked_shl(pin))
}

/// SIUL2 pin controller.
pub struct Siul2 {
    config: Siul2Config,
    regs: Siul2Registers,
    pads: [Pad; SIUL2_PIN_COUNT],
    irq: IrqLine,
    pin_driver: Option<Box<dyn PinDriver>>,
    diag: AccessDiagnostics,
}

impl Default for Siul2 {
    fn default() -> Self {
        Self::new(Siul2Config::default())
    }
}

impl Siul2 {
    /// Creates a controller in its reset state with nothing attached.
    #[must_use]
    pub fn new(config: Siul2Config) -> Self {
        Self {
            config,
            regs: Siul2Registers::reset(&config),
            pads: [Pad::RESET; SIUL2_PIN_COUNT],
            irq: IrqLine::new(),
            pin_driver: None,
            diag: AccessDiagnostics::new(),
        }
    }

    /// Attaches the interrupt line handler.
    #[must_use]
    pub fn with_irq(mut self, handler: impl IrqHandler + 'static) -> Self {
        self.irq = IrqLine::connect(handler);
        self
    }

    /// Attaches the external driver for output pins.
    #[must_use]
    pub fn with_pin_driver(mut self, driver: impl PinDriver + 'static) -> Self {
        self.pin_driver = Some(Box::new(driver));
        self
    }

    /// Returns the construction-time configuration.
    #[must_use]
    pub const fn config(&self) -> &Siul2Config {
        &self.config
    }

    /// Returns the shared registers.
    #[must_use]
    pub const fn registers(&self) -> &Siul2Registers {
        &self.regs
    }

    /// Returns the state of `pin`, or `None` past the last pad.
    #[must_use]
    pub fn pad(&self, pin: usize) -> Option<&Pad> {
        self.pads.get(pin)
    }

    /// Returns the current interrupt line level.
    #[must_use]
    pub const fn irq_level(&self) -> bool {
        self.irq.level()
    }

    /// Returns `true` when `pin` has a latched edge in DISR0.
    #[must_use]
    pub fn interrupt_pending(&self, pin: usize) -> bool {
        pin_bit(pin).is_some_and(|bit| self.regs.disr0 & bit != 0)
    }

    /// Entry point for the external pin driver.
    ///
    /// Latches `level` when the pad's input buffer is enabled, then checks
    /// for a qualifying edge against the previously latched level. Unknown
    /// pins are reported as guest errors and otherwise ignored.
    pub fn set_pin_input(&mut self, pin: usize, level: bool) {
        if pin >= SIUL2_PIN_COUNT {
            self.report(AccessFault::InvalidPin { pin });
            return;
        }

        let pad = &mut self.pads[pin];
        if !pad.input_buffer_enabled() {
            log::trace!("siul2: pin {pin} input buffer disabled, level {level} ignored");
            return;
        }
        let previous = pad.prev_input_level;
        pad.input_level = level;
        pad.prev_input_level = level;

        let Some(bit) = pin_bit(pin) else {
            return;
        };
        if self.regs.direr0 & bit == 0 {
            return;
        }
        let rising = self.regs.ireer0 & bit != 0 && !previous && level;
        let falling = self.regs.ifeer0 & bit != 0 && previous && !level;
        if rising || falling {
            log::debug!(
                "siul2: pin {pin} {} edge latched",
                if rising { "rising" } else { "falling" }
            );
            self.regs.disr0 |= bit;
            self.irq.raise();
        }
    }

    fn drive_output(&mut self, pin: usize, level: bool) {
        let pad = &mut self.pads[pin];
        pad.output_level = level;
        if pad.direction() != Direction::Output {
            return;
        }
        log::trace!("siul2: drive pin {pin} -> {level}");
        if let Some(driver) = self.pin_driver.as_mut() {
            driver.drive_pin(pin, level);
        }
    }

    fn clear_status(&mut self, mask: u32) {
        self.regs.disr0 &= !mask;
        if self.regs.disr0 == 0 {
            self.irq.lower();
        }
    }
}

impl MmioDevice for Siul2 {
    fn name(&self) -> &str {
        "siul2"
    }

    fn try_read(&mut self, offset: u32, width: u8) -> Result<u32, AccessFault> {
        let access = SIUL2_ACCESS.check(offset, width)?;
        let value = match decode(offset).ok_or(AccessFault::InvalidAddress { offset })? {
            Siul2Reg::Midr1 => self.regs.midr1,
            Siul2Reg::Midr2 => self.regs.midr2,
            Siul2Reg::Disr0 => self.regs.disr0,
            Siul2Reg::Direr0 => self.regs.direr0,
            Siul2Reg::Dirsr0 => self.regs.dirsr0,
            Siul2Reg::Ireer0 => self.regs.ireer0,
            Siul2Reg::Ifeer0 => self.regs.ifeer0,
            Siul2Reg::Ifer0 => self.regs.ifer0,
            Siul2Reg::Mscr(pin) => self.pads[pin].mscr.bits(),
            Siul2Reg::Gpdo(pin) => u32::from(self.pads[pin].output_level),
            Siul2Reg::Gpdi(pin) => u32::from(self.pads[pin].input_level),
        };
        Ok(value & access.mask())
    }

    fn try_write(&mut self, offset: u32, width: u8, value: u32) -> Result<(), AccessFault> {
        let value = value & SIUL2_ACCESS.check(offset, width)?.mask();
        match decode(offset).ok_or(AccessFault::InvalidAddress { offset })? {
            Siul2Reg::Midr1 | Siul2Reg::Midr2 | Siul2Reg::Gpdi(_) => {
                return Err(AccessFault::ReadOnly { offset });
            }
            Siul2Reg::Disr0 => self.clear_status(value),
            Siul2Reg::Direr0 => self.regs.direr0 = value,
            Siul2Reg::Dirsr0 => self.regs.dirsr0 = value,
            Siul2Reg::Ireer0 => self.regs.ireer0 = value,
            Siul2Reg::Ifeer0 => self.regs.ifeer0 = value,
            Siul2Reg::Ifer0 => self.regs.ifer0 = value,
            Siul2Reg::Mscr(pin) => self.pads[pin].mscr = Mscr::from_bits_retain(value),
            Siul2Reg::Gpdo(pin) => self.drive_output(pin, value & 1 != 0),
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.regs = Siul2Registers::reset(&self.config);
        self.pads = [Pad::RESET; SIUL2_PIN_COUNT];
        self.irq.lower();
    }

    fn diagnostics(&self) -> &AccessDiagnostics {
        &self.diag
    }

    fn diagnostics_mut(&mut self) -> &mut AccessDiagnostics {
        &mut self.diag
    }
}

impl fmt::Debug for Siul2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Siul2")
            .field("config", &self.config)
            .field("regs", &self.regs)
            .field("irq", &self.irq)
            .field("pin_driver", &self.pin_driver.is_some())
            .field("diag", &self.diag)
            .finish_non_exhaustive()
    }
}
