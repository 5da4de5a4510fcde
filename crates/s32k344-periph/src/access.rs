//! Width and alignment policy for register windows.

use crate::{AccessFault, AccessWidth};

/// Accepted access sizes for one register window.
///
/// Every accepted access must also be naturally aligned to its own size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessRules {
    /// Narrowest accepted access.
    pub min: AccessWidth,
    /// Widest accepted access.
    pub max: AccessWidth,
}

/// Pin controller window: byte, half-word and word accesses.
pub const SIUL2_ACCESS: AccessRules = AccessRules {
    min: AccessWidth::Byte,
    max: AccessWidth::Word,
};

/// Serial controller window: word accesses only.
pub const LPUART_ACCESS: AccessRules = AccessRules {
    min: AccessWidth::Word,
    max: AccessWidth::Word,
};

impl AccessRules {
    /// Validates an access against this window's rules.
    ///
    /// Width is checked before alignment, so a 3-byte access reports
    /// [`AccessFault::InvalidWidth`] regardless of its offset.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::InvalidWidth`] when `width` is not a bus size or
    /// is outside `min..=max`, and [`AccessFault::Unaligned`] when `offset` is
    /// not a multiple of `width`.
    pub fn check(self, offset: u32, width: u8) -> Result<AccessWidth, AccessFault> {
        let access = AccessWidth::from_bytes(width)
            .filter(|access| (self.min..=self.max).contains(access))
            .ok_or(AccessFault::InvalidWidth { offset, width })?;
        if offset % u32::from(access.bytes()) != 0 {
            return Err(AccessFault::Unaligned { offset, width });
        }
        Ok(access)
    }
}
