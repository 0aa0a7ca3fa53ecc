//! Standard-normal variate blocks.
//!
//! A [`VariateBlock`] holds the raw draws for one run, laid out as
//! `(source, step, path)` with paths contiguous:
//!
//! ```text
//! index(s, t, p) = (s · (M + 1) + t) · I + p
//! ```
//!
//! Generation, antithetic pairing and moment matching are separate steps
//! that each consume and return a block. Correlation is applied lazily per
//! step by [`CholeskyFactor::correlate_row`](super::CholeskyFactor::correlate_row).

use super::error::{ConfigError, PricingError};
use crate::rng::PricerRng;

/// Raw standard-normal draws for `n_sources` Brownian drivers over
/// `n_steps + 1` time points and `n_paths` paths.
///
/// Step 0 is drawn but never consumed by the simulators; it keeps the time
/// index aligned with the path matrices.
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::VariateBlock;
/// use pricer_heston::rng::PricerRng;
///
/// let mut rng = PricerRng::from_seed(1);
/// let block = VariateBlock::standard_normal(&mut rng, 2, 4, 6, true).unwrap();
/// assert_eq!(block.len(), 2 * 5 * 6);
///
/// // Antithetic halves mirror each other.
/// let row = block.row(1, 3);
/// assert_eq!(row[0], -row[3]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct VariateBlock {
    n_sources: usize,
    n_times: usize,
    n_paths: usize,
    data: Vec<f64>,
}

impl VariateBlock {
    /// Draws a block of independent standard normals.
    ///
    /// Rows are filled in `(source, step)` order. With `antithetic` set, each
    /// row draws `n_paths / 2` values into its first half and writes their
    /// negations into the second half, pairing path `p` with `p + n_paths / 2`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidParameter` if `n_sources` is zero
    /// - `ConfigError::InvalidStepCount` / `InvalidPathCount` for zero sizes
    /// - `ConfigError::OddAntitheticPathCount` for odd `n_paths` with pairing
    pub fn standard_normal(
        rng: &mut PricerRng,
        n_sources: usize,
        n_steps: usize,
        n_paths: usize,
        antithetic: bool,
    ) -> Result<Self, ConfigError> {
        if n_sources == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "n_sources",
                value: "must be at least 1".to_string(),
            });
        }
        if n_steps == 0 {
            return Err(ConfigError::InvalidStepCount(n_steps));
        }
        if n_paths == 0 {
            return Err(ConfigError::InvalidPathCount(n_paths));
        }
        if antithetic && n_paths % 2 != 0 {
            return Err(ConfigError::OddAntitheticPathCount(n_paths));
        }

        let n_times = n_steps + 1;
        let mut data = vec![0.0; n_sources * n_times * n_paths];

        if antithetic {
            let half = n_paths / 2;
            for row in data.chunks_exact_mut(n_paths) {
                let (first, second) = row.split_at_mut(half);
                rng.fill_normal(first);
                for (mirror, &z) in second.iter_mut().zip(first.iter()) {
                    *mirror = -z;
                }
            }
        } else {
            rng.fill_normal(&mut data);
        }

        Ok(Self {
            n_sources,
            n_times,
            n_paths,
            data,
        })
    }

    /// Rescales the block to population standard deviation 1, then
    /// recentres it to mean 0.
    ///
    /// The statistics are taken over the whole block, not per step.
    ///
    /// # Errors
    ///
    /// `PricingError::NumericalDegeneracy` if the standard deviation is zero
    /// or not finite.
    pub fn moment_matched(mut self) -> Result<Self, PricingError> {
        let std_dev = self.std_dev();
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(PricingError::NumericalDegeneracy {
                stage: "moment matching",
                count: self.data.len(),
            });
        }

        for z in self.data.iter_mut() {
            *z /= std_dev;
        }
        let mean = self.mean();
        for z in self.data.iter_mut() {
            *z -= mean;
        }

        tracing::debug!(std_dev, mean, "moment-matched variate block");
        Ok(self)
    }

    /// Number of Brownian sources.
    #[inline]
    pub fn n_sources(&self) -> usize {
        self.n_sources
    }

    /// Number of time steps M (the block has M + 1 time points).
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_times - 1
    }

    /// Number of paths I.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Total number of draws.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block holds no draws. Never true for a constructed block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Draw for (source, step, path).
    #[inline]
    pub fn get(&self, source: usize, step: usize, path: usize) -> f64 {
        self.data[(source * self.n_times + step) * self.n_paths + path]
    }

    /// All paths of one (source, step) row.
    #[inline]
    pub fn row(&self, source: usize, step: usize) -> &[f64] {
        let start = (source * self.n_times + step) * self.n_paths;
        &self.data[start..start + self.n_paths]
    }

    /// Flat view in `(source, step, path)` order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mean over the whole block.
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Population standard deviation over the whole block.
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let sum_sq: f64 = self.data.iter().map(|z| (z - mean) * (z - mean)).sum();
        (sum_sq / self.data.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_block_shape_and_indexing() {
        let mut rng = PricerRng::from_seed(5);
        let block = VariateBlock::standard_normal(&mut rng, 2, 3, 4, false).unwrap();

        assert_eq!(block.n_sources(), 2);
        assert_eq!(block.n_steps(), 3);
        assert_eq!(block.n_paths(), 4);
        assert_eq!(block.len(), 2 * 4 * 4);
        assert!(!block.is_empty());

        // Row layout agrees with element access.
        let row = block.row(1, 2);
        for p in 0..4 {
            assert_eq!(row[p], block.get(1, 2, p));
            assert_eq!(row[p], block.as_slice()[(4 + 2) * 4 + p]);
        }
    }

    #[test]
    fn test_block_consumes_rng_in_row_order() {
        let mut rng = PricerRng::from_seed(21);
        let block = VariateBlock::standard_normal(&mut rng, 2, 2, 3, false).unwrap();

        let mut reference = PricerRng::from_seed(21);
        let mut expected = vec![0.0; 18];
        reference.fill_normal(&mut expected);

        assert_eq!(block.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_antithetic_halves_are_exact_negatives() {
        let mut rng = PricerRng::from_seed(42);
        let n_paths = 10;
        let block = VariateBlock::standard_normal(&mut rng, 2, 5, n_paths, true).unwrap();

        for s in 0..2 {
            for t in 0..=5 {
                for p in 0..n_paths / 2 {
                    assert_eq!(block.get(s, t, p), -block.get(s, t, p + n_paths / 2));
                }
            }
        }
    }

    #[test]
    fn test_antithetic_rejects_odd_paths() {
        let mut rng = PricerRng::from_seed(0);
        let result = VariateBlock::standard_normal(&mut rng, 2, 5, 7, true);
        assert_eq!(result, Err(ConfigError::OddAntitheticPathCount(7)));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut rng = PricerRng::from_seed(0);
        assert_eq!(
            VariateBlock::standard_normal(&mut rng, 2, 0, 4, false),
            Err(ConfigError::InvalidStepCount(0))
        );
        assert_eq!(
            VariateBlock::standard_normal(&mut rng, 2, 4, 0, false),
            Err(ConfigError::InvalidPathCount(0))
        );
        assert!(matches!(
            VariateBlock::standard_normal(&mut rng, 0, 4, 4, false),
            Err(ConfigError::InvalidParameter { name: "n_sources", .. })
        ));
    }

    #[test]
    fn test_moment_matching_hits_target_moments() {
        let mut rng = PricerRng::from_seed(8);
        let block = VariateBlock::standard_normal(&mut rng, 2, 20, 501, false)
            .unwrap()
            .moment_matched()
            .unwrap();

        assert!(block.mean().abs() < 1e-9);
        assert_relative_eq!(block.std_dev(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_moment_matching_after_antithetic() {
        let mut rng = PricerRng::from_seed(9);
        let block = VariateBlock::standard_normal(&mut rng, 2, 10, 1000, true)
            .unwrap()
            .moment_matched()
            .unwrap();

        assert!(block.mean().abs() < 1e-9);
        assert_relative_eq!(block.std_dev(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_moment_matching_rejects_degenerate_block() {
        // An all-zero block has no spread to rescale.
        let block = VariateBlock {
            n_sources: 1,
            n_times: 2,
            n_paths: 2,
            data: vec![0.0; 4],
        };
        assert!(matches!(
            block.moment_matched(),
            Err(PricingError::NumericalDegeneracy {
                stage: "moment matching",
                ..
            })
        ));
    }
}
