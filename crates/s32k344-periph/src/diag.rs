//! Per-device access diagnostics.

use crate::{AccessFault, FaultKind};

/// Saturating fault counters kept by each register window.
///
/// This is the observability channel for absorbed guest errors: the guest
/// sees a zero read or an ignored write, the host can inspect what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AccessDiagnostics {
    counts: [u32; FaultKind::COUNT],
    last_fault: Option<AccessFault>,
}

impl AccessDiagnostics {
    /// Creates an empty set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fault occurrence, updating the last fault and incrementing
    /// the counter for its kind.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record(&mut self, fault: AccessFault) {
        self.last_fault = Some(fault);
        let slot = &mut self.counts[fault.kind().index()];
        *slot = slot.saturating_add(1);
    }

    /// Returns the number of recorded faults of `kind`.
    #[must_use]
    pub const fn count(&self, kind: FaultKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Returns the number of recorded faults of any kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts
            .iter()
            .fold(0_u32, |acc, count| acc.saturating_add(*count))
    }

    /// Returns the most recently recorded fault, if any.
    #[must_use]
    pub const fn last_fault(&self) -> Option<AccessFault> {
        self.last_fault
    }

    /// Clears all counters and the last fault.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
