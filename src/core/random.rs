//! Per-context pseudo-random stream.
//!
//! A splitmix64 generator: tiny state, deterministic for a given seed, and
//! owned by exactly one context so it needs no locking.

/// Deterministic uniform float generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    state: u64,
}

impl RandomStream {
    /// Create a stream from a raw seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Derive an independent stream for one context from the run's base
    /// seed, so sibling contexts do not replay each other's sequence.
    pub fn for_context(base_seed: u64, ordinal: u64) -> Self {
        let mut mixer = RandomStream::new(base_seed ^ ordinal.wrapping_mul(0x9e3779b97f4a7c15));
        Self::new(mixer.next_u64())
    }

    /// Next raw 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Uniform float in the closed interval [0.0, 1.0].
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits fill the f32 mantissa exactly; dividing by 2^24 - 1 makes
        // both endpoints reachable.
        let bits = (self.next_u64() >> 40) as u32;
        bits as f32 / ((1u32 << 24) - 1) as f32
    }
}
