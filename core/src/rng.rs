//! Deterministic random number generation for synthetic pipelines.
//!
//! RULE: The engine itself never draws random numbers. Only the synthetic
//! pipeline generator does, and it draws exclusively from `SeededRng`
//! streams derived from one master seed.
//!
//! Each generation stage gets its own stream, seeded from
//! (master_seed XOR stage_index). Adding a stage never changes the
//! streams of existing stages.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct SeededRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SeededRng {
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi].
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        lo + self.next_u64_below((hi - lo) as u64 + 1) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }

    /// Pick an index according to relative weights.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        weights.len().saturating_sub(1)
    }
}

/// All generation streams for one master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> SeededRng {
        SeededRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Leads = 0,
    Activities = 1,
    Outcomes = 2,
    Names = 3,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Activities => "activities",
            Self::Outcomes => "outcomes",
            Self::Names => "names",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngBank::new(7).for_stream(StreamSlot::Leads);
        let mut b = RngBank::new(7).for_stream(StreamSlot::Leads);
        for _ in 0..100 {
            assert_eq!(a.next_u64_below(1_000_000), b.next_u64_below(1_000_000));
        }
    }

    #[test]
    fn streams_carry_their_slot_name() {
        let bank = RngBank::new(7);
        assert_eq!(bank.for_stream(StreamSlot::Leads).name, "leads");
        assert_eq!(bank.for_stream(StreamSlot::Names).name, "names");
        assert_eq!(SeededRng::new(7, 9).name, "unnamed");
    }

    #[test]
    fn streams_are_independent() {
        let mut leads = RngBank::new(7).for_stream(StreamSlot::Leads);
        let mut acts = RngBank::new(7).for_stream(StreamSlot::Activities);
        let a: Vec<u64> = (0..8).map(|_| leads.next_u64_below(u64::MAX)).collect();
        let b: Vec<u64> = (0..8).map(|_| acts.next_u64_below(u64::MAX)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn range_and_weights_stay_in_bounds() {
        let mut rng = RngBank::new(99).for_stream(StreamSlot::Outcomes);
        for _ in 0..500 {
            let v = rng.range_inclusive(-3, 3);
            assert!((-3..=3).contains(&v), "out of range: {v}");
            let i = rng.weighted_index(&[0.2, 0.0, 0.8]);
            assert_ne!(i, 1, "zero-weight index drawn");
        }
    }
}
