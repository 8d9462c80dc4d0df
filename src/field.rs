//! Flow-field sampling.
//!
//! The simulation only needs a smooth, deterministic scalar function of
//! `(x, y, t)` with values in `[0, 1)`. Anything implementing
//! [`NoiseSource`] can drive it, including plain closures.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Largest value a [`NoiseSource`] may return.
pub const NOISE_MAX: f64 = 1.0 - f64::EPSILON;

/// A continuous, deterministic scalar field over space and time.
///
/// Implementations must return values in `[0, 1)` and the same value for the
/// same inputs.
pub trait NoiseSource {
    fn sample(&self, x: f64, y: f64, t: f64) -> f64;
}

impl<F> NoiseSource for F
where
    F: Fn(f64, f64, f64) -> f64,
{
    fn sample(&self, x: f64, y: f64, t: f64) -> f64 {
        self(x, y, t)
    }
}

/// Fractal Perlin noise (4 octaves, persistence 0.5) remapped to `[0, 1)`.
pub struct PerlinField {
    noise: Fbm<Perlin>,
}

impl PerlinField {
    pub const OCTAVES: usize = 4;
    pub const PERSISTENCE: f64 = 0.5;

    pub fn new(seed: u32) -> Self {
        let noise = Fbm::<Perlin>::new(seed)
            .set_octaves(Self::OCTAVES)
            .set_persistence(Self::PERSISTENCE);
        Self { noise }
    }

    /// A field with a fresh random seed.
    pub fn random() -> Self {
        Self::new(rand::random())
    }
}

impl NoiseSource for PerlinField {
    fn sample(&self, x: f64, y: f64, t: f64) -> f64 {
        let value = self.noise.get([x, y, t]);
        (value * 0.5 + 0.5).clamp(0.0, NOISE_MAX)
    }
}
