//! Deterministic random number generation.
//!
//! RULE: The generator never calls any platform RNG.
//! All randomness flows through StreamRng instances derived from the
//! single master seed recorded on the run.
//!
//! Each snapshot table gets its own stream, seeded from
//! (master_seed XOR slot_index * golden ratio). Adding a table never
//! shifts an existing table's stream.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one generator stream.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// The slot index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
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

    /// Roll an index in [0, n). `n` must be positive.
    pub fn index(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }

    /// Uniform float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform integer in [lo, hi], inclusive.
    pub fn range_i64(&mut self, lo: i64, hi: i64) -> i64 {
        self.inner.gen_range(lo..=hi)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick from `(item, weight)` pairs proportionally to weight.
    /// Returns None for an empty or zero-weight slice.
    pub fn pick_weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        if items.is_empty() || total <= 0.0 {
            return None;
        }
        let mut roll = self.next_f64() * total;
        for (item, weight) in items {
            if roll < *weight {
                return Some(item);
            }
            roll -= weight;
        }
        items.last().map(|(item, _)| item)
    }

    /// A string of `len` decimal digits.
    pub fn digits(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'0' + self.inner.gen_range(0..10u8)))
            .collect()
    }
}

/// All generator streams for a single seed, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Customer = 0,
    Loan = 1,
    Default = 2,
    Indicator = 3,
    DataQuality = 4,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Loan => "loan",
            Self::Default => "default",
            Self::Indicator => "indicator",
            Self::DataQuality => "data_quality",
        }
    }
}
