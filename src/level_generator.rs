//! Height selection for newly inserted entries.
//!
//! Level 0 of an index contains every entry and each level `n > 0` contains a random subset of
//! the entries on level `n - 1`. The height of an entry is the number of levels it is linked
//! into, and it is drawn once when the entry is inserted.
//!
//! The default generator draws heights from a geometric distribution: starting from a height of
//! one, the height is incremented for as long as an independent trial with probability `p`
//! succeeds. With `p = 0.5` the expected height is two and `P(height >= k) = 2^-(k-1)`.

use crate::error::{Error, Result};
use rand::{self, Rng, SeedableRng, XorShiftRng};

pub const DEFAULT_MAX_HEIGHT: usize = 32;
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Chooses the height of every entry inserted into an index.
///
/// Implement this to drive an index with a deterministic sequence of heights.
pub trait LevelGenerator {
    /// The largest height this generator will ever return.
    fn max_height(&self) -> usize;

    /// Draws the height of a new entry. The result is always in `[1, self.max_height()]`.
    fn random_height(&mut self) -> usize;
}

/// A level generator producing geometrically distributed heights, truncated at a maximum height.
pub struct GeometricLevelGenerator {
    max_height: usize,
    p: f64,
    rng: XorShiftRng,
}

impl GeometricLevelGenerator {
    /// Constructs a generator seeded from the operating system.
    ///
    /// # Examples
    /// ```
    /// use skip_index::level_generator::{GeometricLevelGenerator, LevelGenerator};
    ///
    /// let mut generator = GeometricLevelGenerator::new(16, 0.5).unwrap();
    /// let height = generator.random_height();
    /// assert!(height >= 1 && height <= 16);
    /// ```
    pub fn new(max_height: usize, p: f64) -> Result<Self> {
        Self::validate(max_height, p)?;
        Ok(GeometricLevelGenerator {
            max_height,
            p,
            rng: rand::weak_rng(),
        })
    }

    /// Constructs a generator whose sequence of heights is fully determined by `seed`.
    pub fn from_seed(max_height: usize, p: f64, seed: [u32; 4]) -> Result<Self> {
        Self::validate(max_height, p)?;
        if seed.iter().all(|word| *word == 0) {
            return Err(Error::ZeroSeed);
        }
        Ok(GeometricLevelGenerator {
            max_height,
            p,
            rng: XorShiftRng::from_seed(seed),
        })
    }

    fn validate(max_height: usize, p: f64) -> Result<()> {
        if max_height == 0 {
            return Err(Error::InvalidMaxHeight(max_height));
        }
        if !(p > 0.0 && p < 1.0) {
            return Err(Error::InvalidProbability(p));
        }
        Ok(())
    }

    /// Returns the probability that an entry is promoted to the next level.
    pub fn probability(&self) -> f64 {
        self.p
    }
}

impl Default for GeometricLevelGenerator {
    fn default() -> Self {
        GeometricLevelGenerator {
            max_height: DEFAULT_MAX_HEIGHT,
            p: DEFAULT_PROBABILITY,
            rng: rand::weak_rng(),
        }
    }
}

impl LevelGenerator for GeometricLevelGenerator {
    fn max_height(&self) -> usize {
        self.max_height
    }

    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while height < self.max_height && self.rng.gen::<f64>() < self.p {
            height += 1;
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::{GeometricLevelGenerator, LevelGenerator};
    use crate::error::Error;

    const SEED: [u32; 4] = [1, 1, 1, 1];

    #[test]
    fn test_invalid_max_height() {
        assert_eq!(
            GeometricLevelGenerator::new(0, 0.5).err(),
            Some(Error::InvalidMaxHeight(0)),
        );
    }

    #[test]
    fn test_invalid_probability() {
        assert_eq!(
            GeometricLevelGenerator::new(4, 0.0).err(),
            Some(Error::InvalidProbability(0.0)),
        );
        assert_eq!(
            GeometricLevelGenerator::new(4, 1.0).err(),
            Some(Error::InvalidProbability(1.0)),
        );
    }

    #[test]
    fn test_zero_seed() {
        assert_eq!(
            GeometricLevelGenerator::from_seed(4, 0.5, [0; 4]).err(),
            Some(Error::ZeroSeed),
        );
    }

    #[test]
    fn test_height_bounds() {
        let mut generator = GeometricLevelGenerator::from_seed(3, 0.9, SEED).unwrap();
        for _ in 0..1000 {
            let height = generator.random_height();
            assert!(height >= 1 && height <= 3);
        }

        let mut flat = GeometricLevelGenerator::from_seed(1, 0.5, SEED).unwrap();
        for _ in 0..100 {
            assert_eq!(flat.random_height(), 1);
        }
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = GeometricLevelGenerator::from_seed(32, 0.5, SEED).unwrap();
        let mut b = GeometricLevelGenerator::from_seed(32, 0.5, SEED).unwrap();
        for _ in 0..1000 {
            assert_eq!(a.random_height(), b.random_height());
        }
    }

    #[test]
    fn test_geometric_distribution() {
        const SAMPLES: usize = 100_000;

        let mut generator = GeometricLevelGenerator::from_seed(32, 0.5, SEED).unwrap();
        assert_eq!(generator.probability(), 0.5);
        assert_eq!(generator.max_height(), 32);
        let mut at_least = [0usize; 5];
        let mut total = 0;
        for _ in 0..SAMPLES {
            let height = generator.random_height();
            total += height;
            for (k, count) in at_least.iter_mut().enumerate() {
                if height > k {
                    *count += 1;
                }
            }
        }

        // P(height >= k + 1) = 2^-k
        for (k, count) in at_least.iter().enumerate() {
            let expected = SAMPLES as f64 / f64::from(1u32 << k);
            let observed = *count as f64;
            assert!((observed - expected).abs() < expected * 0.05 + 50.0);
        }

        let mean = total as f64 / SAMPLES as f64;
        assert!((mean - 2.0).abs() < 0.05);
    }
}
