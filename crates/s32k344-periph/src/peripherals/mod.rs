//! Register-level peripheral models.

/// Fixed-capacity byte ring.
pub mod fifo;
/// LPUART serial controller.
pub mod lpuart;
/// SIUL2 pin controller.
pub mod siul2;
