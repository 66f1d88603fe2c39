//! Random source for generation.
//!
//! Seeded runs use a 32-bit linear congruential generator so the same seed
//! produces the same sequence on every platform. Unseeded runs draw from
//! `fastrand`.

/// Numerical Recipes LCG: `state = state * 1664525 + 1013904223 (mod 2^32)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // Upper 24 bits fill the f32 mantissa exactly.
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

pub enum GenRng {
    Seeded(Lcg),
    Entropy(fastrand::Rng),
}

impl GenRng {
    /// Seeded LCG when a seed is given, fresh entropy otherwise.
    pub fn from_seed(seed: Option<u32>) -> Self {
        match seed {
            Some(s) => GenRng::Seeded(Lcg::new(s)),
            None => GenRng::Entropy(fastrand::Rng::new()),
        }
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self, GenRng::Seeded(_))
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        match self {
            GenRng::Seeded(lcg) => lcg.next_f32(),
            GenRng::Entropy(rng) => rng.f32(),
        }
    }

    /// Uniform index in `[0, n)`. `n` must be nonzero.
    pub fn index(&mut self, n: usize) -> usize {
        match self {
            GenRng::Seeded(lcg) => ((lcg.next_f32() * n as f32) as usize).min(n - 1),
            GenRng::Entropy(rng) => rng.usize(..n),
        }
    }

    /// Uniform integer in `[lo, hi)`. Returns `lo` for an empty range.
    pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        lo + self.index((hi - lo) as usize) as u32
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.index(items.len());
        items.get(i)
    }
}
