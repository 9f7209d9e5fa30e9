//! Tunables passed explicitly into calculations.

use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;

/// Sequence length used when a caller has no bound of its own.
pub const DEFAULT_LIMIT: usize = 50;

/// Hard cap on any internal walk over occurrences.
pub const DEFAULT_SCAN_LIMIT: usize = 10_000;

/// Options shared by every calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Length of an occurrence sequence when the caller supplies no limit.
    pub default_limit: usize,
    /// Maximum number of candidates examined when stepping over DST gaps, and
    /// of distinct scheduled days examined by a streak gap scan.
    pub scan_limit: usize,
    /// How wall times inside a DST gap are handled.
    pub dst_policy: DstPolicy,
    /// Reject unknown timezone identifiers at validation instead of falling
    /// back to the system timezone.
    pub strict_timezones: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            scan_limit: DEFAULT_SCAN_LIMIT,
            dst_policy: DstPolicy::default(),
            strict_timezones: false,
        }
    }
}
