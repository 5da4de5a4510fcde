//! S32K344 peripheral memory map and decoding helpers.

use crate::{LPUART_WINDOW_SIZE, SIUL2_WINDOW_SIZE};

/// Base address of the SIUL2 register window.
pub const SIUL2_BASE: u32 = 0x4029_0000;
/// Base address of LPUART0.
pub const LPUART0_BASE: u32 = 0x4032_8000;
/// Distance between consecutive LPUART instances.
pub const LPUART_STRIDE: u32 = 0x4000;
/// Number of LPUART instances on the device.
pub const LPUART_INSTANCE_COUNT: usize = 16;
/// Interrupt number of LPUART0; instance `n` uses `LPUART_IRQ_BASE + n`.
pub const LPUART_IRQ_BASE: u32 = 32;

#[allow(clippy::cast_possible_truncation)]
const LPUART_COUNT: u32 = LPUART_INSTANCE_COUNT as u32;

/// Peripheral selected by an absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PeripheralId {
    /// The SIUL2 pin controller.
    Siul2,
    /// LPUART instance `n`.
    Lpuart(u8),
}

impl PeripheralId {
    /// Returns the absolute base address of this peripheral's window.
    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            Self::Siul2 => SIUL2_BASE,
            Self::Lpuart(instance) => lpuart_base(instance),
        }
    }

    /// Returns the size of this peripheral's register window.
    #[must_use]
    pub const fn window_size(self) -> u32 {
        match self {
            Self::Siul2 => SIUL2_WINDOW_SIZE,
            Self::Lpuart(_) => LPUART_WINDOW_SIZE,
        }
    }

    /// Returns the NVIC interrupt number, where the device has one routed.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn irq(self) -> Option<u32> {
        match self {
            Self::Siul2 => None,
            Self::Lpuart(instance) => Some(LPUART_IRQ_BASE + instance as u32),
        }
    }
}

/// Returns the base address of LPUART `instance`.
#[must_use]
#[allow(clippy::cast_lossless)]
pub const fn lpuart_base(instance: u8) -> u32 {
    LPUART0_BASE + instance as u32 * LPUART_STRIDE
}

/// Decodes an absolute address into the peripheral and window offset.
///
/// Addresses in the gap between an LPUART window and the next instance
/// decode to nothing.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn decode_peripheral(addr: u32) -> Option<(PeripheralId, u32)> {
    if addr >= SIUL2_BASE && addr - SIUL2_BASE < SIUL2_WINDOW_SIZE {
        return Some((PeripheralId::Siul2, addr - SIUL2_BASE));
    }
    if addr < LPUART0_BASE {
        return None;
    }
    let delta = addr - LPUART0_BASE;
    let instance = delta / LPUART_STRIDE;
    let offset = delta % LPUART_STRIDE;
    if instance >= LPUART_COUNT || offset >= LPUART_WINDOW_SIZE {
        return None;
    }
    Some((PeripheralId::Lpuart(instance as u8), offset))
}

const _: () = assert_map_layout();

const fn assert_map_layout() {
    assert!(
        SIUL2_BASE + SIUL2_WINDOW_SIZE <= LPUART0_BASE,
        "siul2 window must not overlap lpuart0"
    );
    assert!(
        LPUART_WINDOW_SIZE <= LPUART_STRIDE,
        "lpuart windows must not overlap"
    );
    assert!(
        lpuart_base(15) == 0x4036_4000,
        "lpuart15 base must match the reference manual"
    );
}
