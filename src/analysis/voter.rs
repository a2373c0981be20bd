// Voter module - fixed-capacity rolling vote history
//
// Each symptom category keeps its own circular history of per-cycle binary
// decisions. Insertion is O(1): while the history is filling, records are
// appended; once full, the oldest slot is overwritten and the running sum is
// adjusted by (new - old). The sum is never recomputed by rescanning.
//
// Storage is a fixed array sized for the largest supported horizon, so the
// voters never touch the heap.

use serde::{Deserialize, Serialize};

use super::bands::SymptomBand;
use super::classifier::VoteRecord;

/// Largest configurable debounce horizon
pub const MAX_VOTER_CAPACITY: usize = 64;

/// Reference horizon: one window per ~5 s over 60 s
pub const DEFAULT_VOTER_CAPACITY: usize = 12;

#[derive(Debug, Clone, Copy, Default)]
struct VoteSlot {
    decision: bool,
    intensity: f32,
}

/// Circular history of one category's votes
#[derive(Debug, Clone)]
pub struct TemporalVoter {
    slots: [VoteSlot; MAX_VOTER_CAPACITY],
    capacity: usize,
    len: usize,
    /// Oldest record once the history is full
    head: usize,
    sum: u32,
    /// Accumulated in f64 so add/subtract rounding stays far below f32 resolution
    intensity_sum: f64,
}

impl TemporalVoter {
    /// Create an empty voter with `capacity` slots
    ///
    /// `capacity` is clamped to `1..=MAX_VOTER_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: [VoteSlot::default(); MAX_VOTER_CAPACITY],
            capacity: capacity.clamp(1, MAX_VOTER_CAPACITY),
            len: 0,
            head: 0,
            sum: 0,
            intensity_sum: 0.0,
        }
    }

    /// Record one cycle's decision and return the updated rolling sum
    ///
    /// `intensity` is tracked only for positive decisions.
    pub fn update(&mut self, decision: bool, intensity: f32) -> u32 {
        let slot = VoteSlot {
            decision,
            intensity: if decision { intensity } else { 0.0 },
        };

        if self.len < self.capacity {
            self.slots[self.len] = slot;
            self.len += 1;
        } else {
            let old = self.slots[self.head];
            self.sum -= old.decision as u32;
            self.intensity_sum -= f64::from(old.intensity);
            self.slots[self.head] = slot;
            self.head = (self.head + 1) % self.capacity;
        }

        self.sum += slot.decision as u32;
        self.intensity_sum += f64::from(slot.intensity);
        if self.sum == 0 {
            // No positive record left: drop whatever rounding remains
            self.intensity_sum = 0.0;
        }
        self.sum
    }

    /// Number of positive decisions among the resident records
    pub fn sum(&self) -> u32 {
        self.sum
    }

    /// Summed intensity of the resident positive decisions
    pub fn intensity_sum(&self) -> f32 {
        self.intensity_sum as f32
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.capacity);
    }
}

/// Rolling sums of both categories after an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoterSums {
    pub tremor: u32,
    pub dyskinesia: u32,
    pub tremor_intensity: f32,
    pub dyskinesia_intensity: f32,
}

/// The two category voters, always updated together
#[derive(Debug, Clone)]
pub struct SymptomVoters {
    tremor: TemporalVoter,
    dyskinesia: TemporalVoter,
}

impl SymptomVoters {
    pub fn new(capacity: usize) -> Self {
        Self {
            tremor: TemporalVoter::new(capacity),
            dyskinesia: TemporalVoter::new(capacity),
        }
    }

    /// Apply one cycle's vote to both histories
    ///
    /// A cycle votes for at most one category; the other receives a 0.
    pub fn update(&mut self, vote: &VoteRecord) -> VoterSums {
        let tremor = vote.tremor;
        let dyskinesia = vote.dyskinesia && !tremor;
        self.tremor.update(tremor, vote.intensity);
        self.dyskinesia.update(dyskinesia, vote.intensity);
        self.sums()
    }

    pub fn sums(&self) -> VoterSums {
        VoterSums {
            tremor: self.tremor.sum(),
            dyskinesia: self.dyskinesia.sum(),
            tremor_intensity: self.tremor.intensity_sum(),
            dyskinesia_intensity: self.dyskinesia.intensity_sum(),
        }
    }

    pub fn sum(&self, band: SymptomBand) -> u32 {
        self.voter(band).sum()
    }

    pub fn intensity_sum(&self, band: SymptomBand) -> f32 {
        self.voter(band).intensity_sum()
    }

    pub fn voter(&self, band: SymptomBand) -> &TemporalVoter {
        match band {
            SymptomBand::Tremor => &self.tremor,
            SymptomBand::Dyskinesia => &self.dyskinesia,
        }
    }

    pub fn capacity(&self) -> usize {
        self.tremor.capacity()
    }

    pub fn reset(&mut self) {
        self.tremor.reset();
        self.dyskinesia.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::VecDeque;

    #[test]
    fn test_fills_before_wrapping() {
        let mut voter = TemporalVoter::new(4);
        assert_eq!(voter.update(true, 1.0), 1);
        assert_eq!(voter.update(false, 1.0), 1);
        assert_eq!(voter.update(true, 1.0), 2);
        assert!(!voter.is_full());
        assert_eq!(voter.update(true, 1.0), 3);
        assert!(voter.is_full());
        assert_eq!(voter.len(), 4);
    }

    #[test]
    fn test_wrap_evicts_oldest_record() {
        let mut voter = TemporalVoter::new(3);
        voter.update(true, 0.0);
        voter.update(false, 0.0);
        voter.update(false, 0.0);
        // Oldest (true) is evicted first
        assert_eq!(voter.update(false, 0.0), 0);
        assert_eq!(voter.update(true, 0.0), 1);
        assert_eq!(voter.len(), 3);
    }

    #[test]
    fn test_sum_matches_sliding_reference() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut voter = TemporalVoter::new(DEFAULT_VOTER_CAPACITY);
        let mut reference: VecDeque<bool> = VecDeque::new();

        for _ in 0..500 {
            let decision = rng.gen_bool(0.6);
            let sum = voter.update(decision, 1.0);

            reference.push_back(decision);
            if reference.len() > DEFAULT_VOTER_CAPACITY {
                reference.pop_front();
            }
            let expected = reference.iter().filter(|&&d| d).count() as u32;

            assert_eq!(sum, expected);
            assert_eq!(voter.sum(), expected);
        }
    }

    #[test]
    fn test_nine_then_three_then_one_more() {
        let mut voter = TemporalVoter::new(12);
        for _ in 0..9 {
            voter.update(true, 1.0);
        }
        for _ in 0..3 {
            voter.update(false, 0.0);
        }
        assert_eq!(voter.sum(), 9);

        voter.update(false, 0.0);
        assert_eq!(voter.sum(), 8);
    }

    #[test]
    fn test_intensity_tracks_positive_votes() {
        let mut voter = TemporalVoter::new(2);
        voter.update(true, 10.0);
        voter.update(false, 50.0);
        assert_eq!(voter.intensity_sum(), 10.0);
        voter.update(true, 4.0);
        assert_eq!(voter.intensity_sum(), 4.0);
    }

    #[test]
    fn test_intensity_sum_does_not_drift() {
        let mut rng = StdRng::seed_from_u64(0x1D);
        let mut voter = TemporalVoter::new(12);
        let mut reference: VecDeque<f32> = VecDeque::new();

        for step in 0..20_000 {
            let decision = rng.gen_bool(0.6);
            let intensity: f32 = rng.gen_range(0.0..5_000.0);
            voter.update(decision, intensity);

            reference.push_back(if decision { intensity } else { 0.0 });
            if reference.len() > 12 {
                reference.pop_front();
            }
            let expected: f64 = reference.iter().map(|&v| f64::from(v)).sum();
            let actual = f64::from(voter.intensity_sum());
            assert!(
                (actual - expected).abs() <= expected.max(1.0) * 1e-6,
                "step {step}: {actual} vs {expected}"
            );
        }

        // Once every positive record is evicted the sum is exactly zero
        for _ in 0..12 {
            voter.update(false, 0.0);
        }
        assert_eq!(voter.intensity_sum(), 0.0);
    }

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(TemporalVoter::new(0).capacity(), 1);
        assert_eq!(
            TemporalVoter::new(MAX_VOTER_CAPACITY + 10).capacity(),
            MAX_VOTER_CAPACITY
        );
    }

    #[test]
    fn test_reset_clears_history() {
        let mut voter = TemporalVoter::new(5);
        voter.update(true, 2.0);
        voter.reset();
        assert!(voter.is_empty());
        assert_eq!(voter.sum(), 0);
        assert_eq!(voter.capacity(), 5);
    }

    #[test]
    fn test_pair_votes_are_complementary() {
        let mut voters = SymptomVoters::new(12);
        let both = VoteRecord {
            tremor: true,
            dyskinesia: true,
            intensity: 5.0,
        };
        let sums = voters.update(&both);
        assert_eq!(sums.tremor, 1);
        assert_eq!(sums.dyskinesia, 0);
        assert_eq!(voters.voter(SymptomBand::Dyskinesia).len(), 1);

        let dyskinesia = VoteRecord {
            tremor: false,
            dyskinesia: true,
            intensity: 7.0,
        };
        let sums = voters.update(&dyskinesia);
        assert_eq!(sums.tremor, 1);
        assert_eq!(sums.dyskinesia, 1);
        assert_eq!(voters.intensity_sum(SymptomBand::Dyskinesia), 7.0);
        assert_eq!(voters.sum(SymptomBand::Tremor), 1);
    }
}
