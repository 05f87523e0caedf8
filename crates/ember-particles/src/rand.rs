//! Injectable random source for every draw the simulation makes

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniform random numbers.
///
/// Emitters own exactly one source and lend it to behaviours and texture
/// providers, so a seeded source makes a whole effect reproducible.
pub trait RandomSource {
    /// Returns a float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Returns a float in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Seedable xorshift32 generator
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Seed from the system clock, for effects that should differ per run
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(0xDEAD_BEEF);
        Self::new(seed)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl Default for ParticleRng {
    fn default() -> Self {
        Self::from_time()
    }
}

impl RandomSource for ParticleRng {
    fn next_f32(&mut self) -> f32 {
        // 24 high bits fit the f32 mantissa exactly, keeping the result below 1.0
        (self.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[cfg(test)]
pub(crate) struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub(crate) fn new(values: &[f32]) -> Self {
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
