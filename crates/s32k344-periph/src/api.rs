//! Register-window contract shared by both controllers.
//!
//! The bus dispatcher sees every controller through [`MmioDevice`]: a
//! fallible decode path (`try_read`/`try_write`) plus provided entry points
//! that absorb faults the way a hardware register window does.

use crate::{AccessDiagnostics, AccessFault};

/// Bus access size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum AccessWidth {
    /// 8-bit access.
    Byte = 1,
    /// 16-bit access.
    Half = 2,
    /// 32-bit access.
    Word = 4,
}

impl AccessWidth {
    /// Decodes a byte count into an access width.
    #[must_use]
    pub const fn from_bytes(width: u8) -> Option<Self> {
        match width {
            1 => Some(Self::Byte),
            2 => Some(Self::Half),
            4 => Some(Self::Word),
            _ => None,
        }
    }

    /// Returns the access size in bytes.
    #[must_use]
    pub const fn bytes(self) -> u8 {
        self as u8
    }

    /// Returns the value mask covering the accessed bytes.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::Byte => 0xFF,
            Self::Half => 0xFFFF,
            Self::Word => u32::MAX,
        }
    }
}

/// Memory-mapped register window driven by the bus dispatcher.
///
/// Implementors provide the decode path and the reset; the provided
/// [`read`](Self::read) and [`write`](Self::write) methods are what the bus
/// calls. They never fail: a faulting read yields 0 and a faulting write is
/// dropped, with the fault logged and counted in
/// [`diagnostics`](Self::diagnostics).
pub trait MmioDevice {
    /// Label used to prefix diagnostics (for example `siul2` or `lpuart0`).
    fn name(&self) -> &str;

    /// Decodes and performs a register read.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessFault`] when the offset, width or alignment is not
    /// accepted by the window. No state changes on error.
    fn try_read(&mut self, offset: u32, width: u8) -> Result<u32, AccessFault>;

    /// Decodes and performs a register write.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessFault`] when the offset, width or alignment is not
    /// accepted by the window, or the target register is read-only. No state
    /// changes on error.
    fn try_write(&mut self, offset: u32, width: u8, value: u32) -> Result<(), AccessFault>;

    /// Restores every register and internal state to its reset value.
    fn reset(&mut self);

    /// Returns the access fault counters.
    fn diagnostics(&self) -> &AccessDiagnostics;

    /// Returns the access fault counters for update.
    fn diagnostics_mut(&mut self) -> &mut AccessDiagnostics;

    /// Reads a register, returning 0 for any faulting access.
    fn read(&mut self, offset: u32, width: u8) -> u32 {
        match self.try_read(offset, width) {
            Ok(value) => {
                log::trace!(
                    "{}: read offset={offset:#06x} width={width} value={value:#010x}",
                    self.name()
                );
                value
            }
            Err(fault) => {
                self.report(fault);
                0
            }
        }
    }

    /// Writes a register, ignoring any faulting access.
    fn write(&mut self, offset: u32, width: u8, value: u32) {
        log::trace!(
            "{}: write offset={offset:#06x} width={width} value={value:#010x}",
            self.name()
        );
        if let Err(fault) = self.try_write(offset, width, value) {
            self.report(fault);
        }
    }

    /// Logs and counts an absorbed fault.
    fn report(&mut self, fault: AccessFault) {
        log::warn!("{}: {fault}", self.name());
        self.diagnostics_mut().record(fault);
    }
}
