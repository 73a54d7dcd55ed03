use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Timestamp attached to every snapshot.
///
/// Combines wall-clock milliseconds with a logical counter so that the
/// snapshots of one entity are strictly ordered even when the wall clock
/// stalls or steps backwards.
///
/// Ordering: `physical_ms` → `logical`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemporalAnchor {
    /// Wall-clock milliseconds since UNIX epoch.
    pub physical_ms: u64,
    /// Logical counter for events at the same physical time.
    pub logical: u32,
}

impl TemporalAnchor {
    pub fn new(physical_ms: u64, logical: u32) -> Self {
        Self {
            physical_ms,
            logical,
        }
    }

    /// Create an anchor for the current wall-clock time.
    pub fn now() -> Self {
        let physical_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            physical_ms,
            logical: 0,
        }
    }

    pub const fn zero() -> Self {
        Self {
            physical_ms: 0,
            logical: 0,
        }
    }

    /// Current time, bumped to be strictly after `previous` when needed.
    pub fn after(previous: &Self) -> Self {
        let now = Self::now();
        if now.physical_ms > previous.physical_ms {
            now
        } else {
            Self::new(previous.physical_ms, previous.logical.saturating_add(1))
        }
    }

    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl PartialOrd for TemporalAnchor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TemporalAnchor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.physical_ms
            .cmp(&other.physical_ms)
            .then(self.logical.cmp(&other.logical))
    }
}

impl fmt::Debug for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemporalAnchor({}ms.{})", self.physical_ms, self.logical)
    }
}

impl fmt::Display for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.physical_ms, self.logical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_physical_first() {
        let a = TemporalAnchor::new(100, 5);
        let b = TemporalAnchor::new(200, 0);
        assert!(a < b);
    }

    #[test]
    fn ordering_logical_second() {
        let a = TemporalAnchor::new(100, 1);
        let b = TemporalAnchor::new(100, 2);
        assert!(a < b);
        assert!(b.is_after(&a));
    }

    #[test]
    fn now_produces_reasonable_timestamp() {
        let anchor = TemporalAnchor::now();
        // After 2020-01-01.
        assert!(anchor.physical_ms > 1_577_836_800_000);
        assert_eq!(anchor.logical, 0);
    }

    #[test]
    fn after_is_strictly_later_than_future_anchor() {
        let future = TemporalAnchor::new(u64::MAX - 1, 7);
        let next = TemporalAnchor::after(&future);
        assert_eq!(next, TemporalAnchor::new(u64::MAX - 1, 8));
    }

    #[test]
    fn after_uses_wall_clock_when_ahead() {
        let past = TemporalAnchor::zero();
        let next = TemporalAnchor::after(&past);
        assert!(next.is_after(&past));
        assert_eq!(next.logical, 0);
    }

    #[test]
    fn display_format() {
        assert_eq!(TemporalAnchor::new(1000, 5).to_string(), "1000.5");
    }
}
