//! LPUART serial controller.
//!
//! Transmission is write-through: a DATA write with the transmitter enabled
//! hands the byte to the attached [`ByteSink`] before returning, so TDRE and
//! TC never drop. Received bytes queue in a 16-entry FIFO that software
//! drains through DATA; RDRF mirrors FIFO occupancy. Bytes arriving while the
//! FIFO is full are dropped without raising OR.

use std::fmt;

use bitflags::bitflags;

use super::fifo::ByteFifo;
use crate::access::LPUART_ACCESS;
use crate::signal::{ByteSink, IrqHandler, IrqLine};
use crate::{AccessDiagnostics, AccessFault, MmioDevice};

/// Size of the register window in bytes.
pub const LPUART_WINDOW_SIZE: u32 = 0x100;
/// Number of word slots backed by storage (`0x00..0x40`).
pub const LPUART_REG_COUNT: usize = 16;
/// Depth of each FIFO in bytes.
pub const LPUART_FIFO_DEPTH: usize = 16;

/// Version ID register offset.
pub const LPUART_VERID: u32 = 0x00;
/// Parameter register offset.
pub const LPUART_PARAM: u32 = 0x04;
/// Global register offset.
pub const LPUART_GLOBAL: u32 = 0x08;
/// Pin configuration register offset.
pub const LPUART_PINCFG: u32 = 0x0C;
/// Baud rate register offset.
pub const LPUART_BAUD: u32 = 0x10;
/// Status register offset.
pub const LPUART_STAT: u32 = 0x14;
/// Control register offset.
pub const LPUART_CTRL: u32 = 0x18;
/// Data register offset.
pub const LPUART_DATA: u32 = 0x1C;
/// Match address register offset.
pub const LPUART_MATCH: u32 = 0x20;
/// Modem IrDA register offset.
pub const LPUART_MODIR: u32 = 0x24;
/// FIFO register offset.
pub const LPUART_FIFO: u32 = 0x28;
/// Watermark register offset.
pub const LPUART_WATER: u32 = 0x2C;

/// VERID contents (version 4.3.3).
pub const LPUART_VERID_VALUE: u32 = 0x0403_0003;
/// PARAM contents (16-entry TX and RX FIFOs).
pub const LPUART_PARAM_VALUE: u32 = 0x0000_0F0F;

bitflags! {
    /// Status register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Stat: u32 {
        /// Parity error.
        const PF = 1 << 16;
        /// Framing error.
        const FE = 1 << 17;
        /// Noise detected.
        const NF = 1 << 18;
        /// Receiver overrun.
        const OR = 1 << 19;
        /// Idle line.
        const IDLE = 1 << 20;
        /// Receive data register full.
        const RDRF = 1 << 21;
        /// Transmission complete.
        const TC = 1 << 22;
        /// Transmit data register empty.
        const TDRE = 1 << 23;
    }
}

impl Stat {
    /// Bits software may clear by writing 1.
    pub const WRITE_ONE_TO_CLEAR: Self = Self::IDLE
        .union(Self::OR)
        .union(Self::NF)
        .union(Self::FE)
        .union(Self::PF);
}

bitflags! {
    /// Control register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Ctrl: u32 {
        /// Receiver enable.
        const RE = 1 << 18;
        /// Transmitter enable.
        const TE = 1 << 19;
        /// Receiver interrupt enable.
        const RIE = 1 << 21;
        /// Transmit interrupt enable.
        const TIE = 1 << 23;
    }
}

bitflags! {
    /// FIFO register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FifoFlags: u32 {
        /// Receive FIFO enable.
        const RXFE = 1 << 3;
        /// Transmit FIFO enable.
        const TXFE = 1 << 7;
    }
}

/// Construction-time instance selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LpuartConfig {
    /// Instance number (`0..16` on the S32K344).
    pub instance: u8,
}

#[allow(clippy::cast_possible_truncation)]
const fn slot(offset: u32) -> usize {
    (offset / 4) as usize
}

const STAT: usize = slot(LPUART_STAT);
const CTRL: usize = slot(LPUART_CTRL);
const FIFO: usize = slot(LPUART_FIFO);

const fn reset_registers() -> [u32; LPUART_REG_COUNT] {
    let mut regs = [0; LPUART_REG_COUNT];
    regs[STAT] = Stat::TDRE.union(Stat::TC).bits();
    regs[FIFO] = FifoFlags::TXFE.union(FifoFlags::RXFE).bits();
    regs
}

/// LPUART serial controller.
pub struct Lpuart {
    config: LpuartConfig,
    label: String,
    regs: [u32; LPUART_REG_COUNT],
    tx_fifo: ByteFifo<LPUART_FIFO_DEPTH>,
    rx_fifo: ByteFifo<LPUART_FIFO_DEPTH>,
    irq: IrqLine,
    sink: Option<Box<dyn ByteSink>>,
    diag: AccessDiagnostics,
}

impl Default for Lpuart {
    fn default() -> Self {
        Self::new(LpuartConfig::default())
    }
}

impl Lpuart {
    /// Creates a controller in its reset state with nothing attached.
    #[must_use]
    pub fn new(config: LpuartConfig) -> Self {
        Self {
            config,
            label: format!("lpuart{}", config.instance),
            regs: reset_registers(),
            tx_fifo: ByteFifo::new(),
            rx_fifo: ByteFifo::new(),
            irq: IrqLine::new(),
            sink: None,
            diag: AccessDiagnostics::new(),
        }
    }

    /// Attaches the interrupt line handler.
    #[must_use]
    pub fn with_irq(mut self, handler: impl IrqHandler + 'static) -> Self {
        self.irq = IrqLine::connect(handler);
        self
    }

    /// Attaches the transport receiving transmitted bytes.
    #[must_use]
    pub fn with_byte_sink(mut self, sink: impl ByteSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Returns the instance number.
    #[must_use]
    pub const fn instance(&self) -> u8 {
        self.config.instance
    }

    /// Returns the stored register file.
    ///
    /// VERID and PARAM slots hold whatever software last wrote; reads of
    /// those offsets always return the fixed identification values.
    #[must_use]
    pub const fn registers(&self) -> &[u32; LPUART_REG_COUNT] {
        &self.regs
    }

    /// Returns the stored status flags without refreshing them.
    #[must_use]
    pub const fn stat(&self) -> Stat {
        Stat::from_bits_retain(self.regs[STAT])
    }

    /// Returns the control flags.
    #[must_use]
    pub const fn ctrl(&self) -> Ctrl {
        Ctrl::from_bits_retain(self.regs[CTRL])
    }

    /// Returns the number of bytes waiting in the receive FIFO.
    #[must_use]
    pub const fn rx_fifo_len(&self) -> usize {
        self.rx_fifo.len()
    }

    /// Returns the number of bytes queued for transmission.
    #[must_use]
    pub const fn tx_fifo_len(&self) -> usize {
        self.tx_fifo.len()
    }

    /// Returns the current interrupt line level.
    #[must_use]
    pub const fn irq_level(&self) -> bool {
        self.irq.level()
    }

    /// Free receive FIFO space, for throttling the external transport.
    #[must_use]
    pub const fn can_receive(&self) -> usize {
        self.rx_fifo.remaining()
    }

    /// Entry point for the external transport.
    ///
    /// Queues as many leading bytes as fit and returns that count. Nothing
    /// is accepted while the receiver is disabled.
    pub fn receive_bytes(&mut self, bytes: &[u8]) -> usize {
        if !self.ctrl().contains(Ctrl::RE) {
            log::trace!("{}: receiver disabled, {} bytes ignored", self.label, bytes.len());
            return 0;
        }
        let accepted = self.rx_fifo.extend_from(bytes);
        if accepted < bytes.len() {
            log::debug!(
                "{}: rx fifo full, dropped {} bytes",
                self.label,
                bytes.len() - accepted
            );
        }
        if !self.rx_fifo.is_empty() {
            self.regs[STAT] |= Stat::RDRF.bits();
            self.update_irq();
        }
        accepted
    }

    fn update_irq(&mut self) {
        let stat = self.stat();
        let ctrl = self.ctrl();
        let pending = (ctrl.contains(Ctrl::TIE) && stat.contains(Stat::TDRE))
            || (ctrl.contains(Ctrl::RIE) && stat.contains(Stat::RDRF));
        self.irq.set(pending);
    }

    fn pop_rx(&mut self) -> u32 {
        let Some(byte) = self.rx_fifo.pop() else {
            return 0;
        };
        if self.rx_fifo.is_empty() {
            self.regs[STAT] &= !Stat::RDRF.bits();
        }
        u32::from(byte)
    }

    fn refresh_stat(&mut self) -> u32 {
        let mut stat = self.stat() | Stat::TDRE | Stat::TC;
        if !self.rx_fifo.is_empty() {
            stat |= Stat::RDRF;
        }
        self.regs[STAT] = stat.bits();
        stat.bits()
    }

    fn transmit(&mut self, value: u32) {
        if !self.ctrl().contains(Ctrl::TE) {
            log::trace!("{}: transmitter disabled, data write ignored", self.label);
            return;
        }
        let [byte, ..] = value.to_le_bytes();
        log::trace!("{}: tx {byte:#04x}", self.label);
        if let Some(sink) = self.sink.as_mut() {
            sink.transmit_byte(byte);
        }
        self.regs[STAT] |= (Stat::TDRE | Stat::TC).bits();
    }

    fn decode(offset: u32, width: u8) -> Result<usize, AccessFault> {
        LPUART_ACCESS.check(offset, width)?;
        let index = slot(offset);
        if index < LPUART_REG_COUNT {
            Ok(index)
        } else {
            Err(AccessFault::InvalidAddress { offset })
        }
    }
}

impl MmioDevice for Lpuart {
    fn name(&self) -> &str {
        &self.label
    }

    fn try_read(&mut self, offset: u32, width: u8) -> Result<u32, AccessFault> {
        let index = Self::decode(offset, width)?;
        let value = match offset {
            LPUART_VERID => LPUART_VERID_VALUE,
            LPUART_PARAM => LPUART_PARAM_VALUE,
            LPUART_DATA => self.pop_rx(),
            LPUART_STAT => self.refresh_stat(),
            _ => self.regs[index],
        };
        Ok(value)
    }

    fn try_write(&mut self, offset: u32, width: u8, value: u32) -> Result<(), AccessFault> {
        let index = Self::decode(offset, width)?;
        match offset {
            LPUART_DATA => self.transmit(value),
            LPUART_STAT => {
                self.regs[STAT] &= !(value & Stat::WRITE_ONE_TO_CLEAR.bits());
            }
            LPUART_CTRL => {
                self.regs[CTRL] = value;
                self.update_irq();
            }
            _ => self.regs[index] = value,
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.regs = reset_registers();
        self.tx_fifo.clear();
        self.rx_fifo.clear();
        self.irq.lower();
    }

    fn diagnostics(&self) -> &AccessDiagnostics {
        &self.diag
    }

    fn diagnostics_mut(&mut self) -> &mut AccessDiagnostics {
        &mut self.diag
    }
}

impl fmt::Debug for Lpuart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lpuart")
            .field("instance", &self.config.instance)
            .field("regs", &self.regs)
            .field("rx_fifo", &self.rx_fifo)
            .field("irq", &self.irq)
            .field("sink", &self.sink.is_some())
            .field("diag", &self.diag)
            .finish_non_exhaustive()
    }
}
