//! Hash-key ranges assigned to downstream tasks.

use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` over non-negative hash keys.
///
/// `skewed` marks ranges containing at least one hot key, so the executor
/// can apply targeted mitigation when scheduling the owning task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRange {
    pub start: u64,
    pub end: u64,
    pub skewed: bool,
}

impl HashRange {
    pub fn of(start: u64, end: u64, skewed: bool) -> Self {
        Self { start, end, skewed }
    }

    pub fn contains(&self, key: u64) -> bool {
        key >= self.start && key < self.end
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_membership() {
        let range = HashRange::of(2, 5, false);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
        assert_eq!(range.len(), 3);
        assert!(!range.is_empty());
    }

    #[test]
    fn zero_length_range_contains_nothing() {
        let range = HashRange::of(3, 3, true);
        assert!(range.is_empty());
        assert!(!range.contains(3));
        assert!(range.skewed);
    }
}
