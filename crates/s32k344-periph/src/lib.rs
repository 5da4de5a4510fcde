//! Register-level models of the NXP S32K344 SIUL2 pin controller and LPUART
//! serial controller.
//!
//! Both controllers are passive state machines: a host bus loop calls
//! [`MmioDevice::read`]/[`MmioDevice::write`] with window offsets, external
//! collaborators push pin levels and received bytes in, and the controllers
//! call back out through the seams in [`signal`].

/// Guest-visible access fault taxonomy.
mod fault;
pub use fault::{AccessFault, FaultKind};

/// Per-device fault counters.
mod diag;
pub use diag::AccessDiagnostics;

/// Register-window contract shared by every controller.
pub mod api;
pub use api::{AccessWidth, MmioDevice};

/// Width and alignment policy per register window.
pub mod access;
pub use access::{AccessRules, LPUART_ACCESS, SIUL2_ACCESS};

/// Interrupt, pin-output and byte-sink callback seams.
pub mod signal;
pub use signal::{ByteSink, IrqHandler, IrqLine, PinDriver};

/// SIUL2 and LPUART controller models.
pub mod peripherals;
pub use peripherals::fifo::ByteFifo;
pub use peripherals::lpuart::{
    Ctrl, FifoFlags, Lpuart, LpuartConfig, Stat, LPUART_BAUD, LPUART_CTRL, LPUART_DATA,
    LPUART_FIFO, LPUART_FIFO_DEPTH, LPUART_GLOBAL, LPUART_MATCH, LPUART_MODIR, LPUART_PARAM,
    LPUART_PARAM_VALUE, LPUART_PINCFG, LPUART_REG_COUNT, LPUART_STAT, LPUART_VERID,
    LPUART_VERID_VALUE, LPUART_WATER, LPUART_WINDOW_SIZE,
};
pub use peripherals::siul2::{
    Direction, Mscr, Pad, Siul2, Siul2Config, Siul2Registers, SIUL2_DIRER0, SIUL2_DIRSR0,
    SIUL2_DISR0, SIUL2_GPDI_BASE, SIUL2_GPDO_BASE, SIUL2_IFEER0, SIUL2_IFER0, SIUL2_IREER0,
    SIUL2_MIDR1, SIUL2_MIDR1_RESET, SIUL2_MIDR2, SIUL2_MIDR2_RESET, SIUL2_MSCR_BASE,
    SIUL2_PIN_COUNT, SIUL2_WINDOW_SIZE,
};

/// S32K344 peripheral memory map.
pub mod map;
pub use map::{
    decode_peripheral, lpuart_base, PeripheralId, LPUART0_BASE, LPUART_INSTANCE_COUNT,
    LPUART_IRQ_BASE, LPUART_STRIDE, SIUL2_BASE,
};

/// Absolute-address dispatcher over the attached controllers.
pub mod bus;
pub use bus::PeripheralBus;

/// Lock-protected handles for concurrent callers.
pub mod shared;
pub use shared::SharedDevice;

#[cfg(test)]
use env_logger as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
