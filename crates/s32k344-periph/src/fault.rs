use thiserror::Error;

/// Fault classes used for diagnostics aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultKind {
    /// Access outside any decoded register or pin block.
    InvalidAddress = 0,
    /// Access width not accepted by the register window.
    InvalidWidth = 1,
    /// Access offset not aligned to the access width.
    Unaligned = 2,
    /// Write targeting a read-only register.
    ReadOnly = 3,
    /// External pin event named a pin the controller does not have.
    InvalidPin = 4,
}

impl FaultKind {
    /// Number of distinct fault kinds.
    pub const COUNT: usize = 5;

    /// All fault kinds in counter order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::InvalidAddress,
        Self::InvalidWidth,
        Self::Unaligned,
        Self::ReadOnly,
        Self::InvalidPin,
    ];

    /// Returns the counter slot for this kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Guest-visible register access fault.
///
/// These never propagate past a device's bus-facing entry points: the
/// [`MmioDevice`](crate::MmioDevice) provided methods log them, count them and
/// fall back to a zero read or an ignored write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessFault {
    /// No register or pin slot decodes at this offset.
    #[error("bad offset {offset:#06x}")]
    InvalidAddress {
        /// Offset within the register window (or absolute address at the bus).
        offset: u32,
    },
    /// The window does not accept accesses of this size.
    #[error("unsupported {width}-byte access at offset {offset:#06x}")]
    InvalidWidth {
        /// Offset within the register window.
        offset: u32,
        /// Requested access size in bytes.
        width: u8,
    },
    /// The offset is not a multiple of the access size.
    #[error("unaligned {width}-byte access at offset {offset:#06x}")]
    Unaligned {
        /// Offset within the register window.
        offset: u32,
        /// Requested access size in bytes.
        width: u8,
    },
    /// Write to an identification or input-data register.
    #[error("write to read-only register at offset {offset:#06x}")]
    ReadOnly {
        /// Offset within the register window.
        offset: u32,
    },
    /// Pin index beyond the controller's pin count.
    #[error("pin index {pin} out of range")]
    InvalidPin {
        /// Requested pin index.
        pin: usize,
    },
}

impl AccessFault {
    /// Returns the diagnostics class for this fault.
    #[must_use]
    pub const fn kind(self) -> FaultKind {
        match self {
            Self::InvalidAddress { .. } => FaultKind::InvalidAddress,
            Self::InvalidWidth { .. } => FaultKind::InvalidWidth,
            Self::Unaligned { .. } => FaultKind::Unaligned,
            Self::ReadOnly { .. } => FaultKind::ReadOnly,
            Self::InvalidPin { .. } => FaultKind::InvalidPin,
        }
    }

    /// Returns the faulting register offset, when the fault came from a
    /// register access.
    #[must_use]
    pub const fn offset(self) -> Option<u32> {
        match self {
            Self::InvalidAddress { offset }
            | Self::InvalidWidth { offset, .. }
            | Self::Unaligned { offset, .. }
            | Self::ReadOnly { offset } => Some(offset),
            Self::InvalidPin { .. } => None,
        }
    }
}
