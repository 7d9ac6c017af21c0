//! Inter-beat interval history for BPM smoothing.
//!
//! Keeps the last [`RATE_HISTORY_LEN`] IBI values in arrival order. Pushing
//! into a full history drops the oldest value.

use heapless::Deque;

use crate::config::{MS_PER_MINUTE, RATE_HISTORY_LEN};

/// Fixed-capacity FIFO of inter-beat intervals in milliseconds.
#[derive(Clone, Debug)]
pub struct RateHistory {
    buffer: Deque<u32, RATE_HISTORY_LEN>,
}

impl RateHistory {
    /// Create an empty (unseeded) history.
    pub const fn new() -> Self { Self { buffer: Deque::new() } }

    /// Fill every slot with `ibi`, replacing any previous content.
    pub fn seed(
        &mut self,
        ibi: u32,
    ) {
        self.buffer.clear();
        while self.buffer.push_back(ibi).is_ok() {}
    }

    /// Append `ibi`, dropping the oldest value if the history is full.
    pub fn push(
        &mut self,
        ibi: u32,
    ) {
        if self.buffer.is_full() {
            self.buffer.pop_front();
        }
        // Cannot fail: a slot was freed above if needed
        let _ = self.buffer.push_back(ibi);
    }

    /// True once all slots hold a value.
    #[inline]
    pub fn is_seeded(&self) -> bool { self.buffer.is_full() }

    /// Number of stored intervals.
    #[inline]
    pub fn len(&self) -> usize { self.buffer.len() }

    /// Check if no interval has been stored yet.
    #[inline]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    /// Truncated mean of the stored intervals.
    pub fn average(&self) -> Option<u32> {
        if self.buffer.is_empty() {
            return None;
        }
        let total: u32 = self.buffer.iter().sum();
        Some(total / self.buffer.len() as u32)
    }

    /// Smoothed heart rate: `60000 / average`, truncated.
    ///
    /// Returns `None` until the history is seeded, or if the average is zero.
    pub fn bpm(&self) -> Option<u32> {
        if !self.is_seeded() {
            return None;
        }
        self.average().and_then(|avg| MS_PER_MINUTE.checked_div(avg))
    }

    /// Iterate over intervals from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &u32> { self.buffer.iter() }

    /// Copy the intervals into an array, oldest first. Unfilled slots are zero.
    pub fn to_array(&self) -> [u32; RATE_HISTORY_LEN] {
        let mut out = [0; RATE_HISTORY_LEN];
        for (slot, ibi) in out.iter_mut().zip(self.buffer.iter()) {
            *slot = *ibi;
        }
        out
    }
}

impl Default for RateHistory {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_is_empty() {
        let history = RateHistory::new();
        assert!(history.is_empty());
        assert!(!history.is_seeded());
        assert!(history.average().is_none());
        assert!(history.bpm().is_none());
    }

    #[test]
    fn test_seed_fills_all_slots() {
        let mut history = RateHistory::new();
        history.seed(600);
        assert_eq!(history.len(), RATE_HISTORY_LEN);
        assert!(history.is_seeded());
        assert_eq!(history.to_array(), [600; RATE_HISTORY_LEN]);
        assert_eq!(history.bpm(), Some(100));
    }

    #[test]
    fn test_reseed_replaces_content() {
        let mut history = RateHistory::new();
        history.seed(600);
        history.push(900);
        history.seed(750);
        assert_eq!(history.to_array(), [750; RATE_HISTORY_LEN]);
    }

    #[test]
    fn test_push_drops_oldest() {
        let mut history = RateHistory::new();
        history.seed(600);
        history.push(700);
        history.push(800);

        let values = history.to_array();
        assert_eq!(history.len(), RATE_HISTORY_LEN);
        assert_eq!(values[RATE_HISTORY_LEN - 2], 700);
        assert_eq!(values[RATE_HISTORY_LEN - 1], 800);
        assert_eq!(values[0], 600);

        // Eight more pushes flush every seeded value
        for _ in 0..8 {
            history.push(1000);
        }
        assert!(history.iter().all(|&ibi| ibi != 600));
        assert_eq!(history.iter().next(), Some(&700));
        let values = history.to_array();
        assert_eq!(values[..2], [700, 800]);
        assert!(values[2..].iter().all(|&ibi| ibi == 1000));
    }

    #[test]
    fn test_average_truncates() {
        let mut history = RateHistory::new();
        history.seed(600);
        history.push(609);
        // (9 * 600 + 609) / 10 = 600.9 -> 600
        assert_eq!(history.average(), Some(600));
        assert_eq!(history.bpm(), Some(100));
    }

    #[test]
    fn test_bpm_uses_truncated_average() {
        let mut history = RateHistory::new();
        history.seed(800);
        assert_eq!(history.bpm(), Some(75));

        history.push(799);
        // average = 7999 / 10 = 799, 60000 / 799 = 75.09 -> 75
        assert_eq!(history.bpm(), Some(75));

        history.seed(601);
        // 60000 / 601 = 99.83 -> 99
        assert_eq!(history.bpm(), Some(99));
    }

    #[test]
    fn test_bpm_requires_full_history() {
        let mut history = RateHistory::new();
        history.push(600);
        assert_eq!(history.len(), 1);
        assert!(history.bpm().is_none());
    }

    #[test]
    fn test_zero_average_has_no_bpm() {
        let mut history = RateHistory::new();
        history.seed(0);
        assert_eq!(history.average(), Some(0));
        assert!(history.bpm().is_none());
    }
}
