//! Sources of the GDP multiplier.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::config::{GDP_MULTIPLIER_MAX, GDP_MULTIPLIER_MIN};

/// Fractional digits of a sampled multiplier.
const MULTIPLIER_SCALE: u32 = 4;

/// Supplies the multiplier `M` used in `population * M / rate`.
///
/// Implementations must return values in `[GDP_MULTIPLIER_MIN, GDP_MULTIPLIER_MAX)`.
pub trait MultiplierSource: Send {
    fn sample(&mut self) -> Decimal;
}

/// Uniform multiplier backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct RandomMultiplier {
    rng: StdRng,
}

impl RandomMultiplier {
    /// Seeds from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl MultiplierSource for RandomMultiplier {
    fn sample(&mut self) -> Decimal {
        let unit = 10i64.pow(MULTIPLIER_SCALE);
        let low = i64::from(GDP_MULTIPLIER_MIN) * unit;
        let high = i64::from(GDP_MULTIPLIER_MAX) * unit;
        Decimal::new(self.rng.random_range(low..high), MULTIPLIER_SCALE)
    }
}

/// Always returns the same multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMultiplier(pub Decimal);

impl MultiplierSource for FixedMultiplier {
    fn sample(&mut self) -> Decimal {
        self.0
    }
}
