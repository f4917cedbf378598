//! Random train/eval/test partitioning of rating records.
//!
//! Eval indices are drawn first from the whole table, test indices from what
//! is left, and the remainder is train. Train can then be down-sampled to a
//! fraction of itself. All draws are uniform without replacement, so the three
//! sets are always pairwise disjoint.

use crate::{Error, Rating, Result};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Split ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of all records sent to eval.
    pub eval_ratio: f64,
    /// Fraction of all records sent to test.
    pub test_ratio: f64,
    /// Fraction of the train remainder that is kept.
    pub train_ratio: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            eval_ratio: 0.2,
            test_ratio: 0.2,
            train_ratio: 1.0,
        }
    }
}

impl SplitConfig {
    /// Check that every ratio is in `[0, 1]` and eval + test does not exceed 1.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("eval_ratio", self.eval_ratio),
            ("test_ratio", self.test_ratio),
            ("train_ratio", self.train_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidRatio(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.eval_ratio + self.test_ratio > 1.0 + f64::EPSILON {
            return Err(Error::InvalidRatio(format!(
                "eval_ratio + test_ratio must not exceed 1, got {} + {}",
                self.eval_ratio, self.test_ratio
            )));
        }
        Ok(())
    }
}

/// Indices of each partition into the input table.
///
/// `eval` and `test` are in draw order; `train` is ascending unless it was
/// down-sampled, in which case it is in draw order too.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitIndices {
    /// Train indices.
    pub train: Vec<usize>,
    /// Eval indices.
    pub eval: Vec<usize>,
    /// Test indices.
    pub test: Vec<usize>,
}

/// Partition `0..n` according to `config`.
///
/// # Example
///
/// ```rust
/// use kgsaint_core::algo::split::{split_indices, SplitConfig};
/// use rand::SeedableRng;
/// use rand_xorshift::XorShiftRng;
///
/// let mut rng = XorShiftRng::seed_from_u64(42);
/// let split = split_indices(10, &SplitConfig::default(), &mut rng).unwrap();
///
/// assert_eq!(split.eval.len(), 2);
/// assert_eq!(split.test.len(), 2);
/// assert_eq!(split.train.len(), 6);
/// ```
///
/// # Errors
///
/// [`Error::InvalidRatio`] for out-of-range ratios, or if the ratios ask for
/// more distinct indices than `n`.
pub fn split_indices<R: Rng + ?Sized>(
    n: usize,
    config: &SplitConfig,
    rng: &mut R,
) -> Result<SplitIndices> {
    config.validate()?;

    let eval_count = (n as f64 * config.eval_ratio).floor() as usize;
    let test_count = (n as f64 * config.test_ratio).floor() as usize;
    if eval_count + test_count > n {
        return Err(Error::InvalidRatio(format!(
            "{eval_count} eval + {test_count} test indices requested from {n} records"
        )));
    }

    let eval = index::sample(rng, n, eval_count).into_vec();

    let mut taken = vec![false; n];
    for &i in &eval {
        taken[i] = true;
    }
    let left: Vec<usize> = (0..n).filter(|&i| !taken[i]).collect();

    let test: Vec<usize> = index::sample(rng, left.len(), test_count)
        .iter()
        .map(|i| left[i])
        .collect();
    for &i in &test {
        taken[i] = true;
    }

    let mut train: Vec<usize> = (0..n).filter(|&i| !taken[i]).collect();
    if config.train_ratio < 1.0 {
        let keep = (train.len() as f64 * config.train_ratio).floor() as usize;
        train = index::sample(rng, train.len(), keep)
            .iter()
            .map(|i| train[i])
            .collect();
    }

    debug!(
        train = train.len(),
        eval = eval.len(),
        test = test.len(),
        "split indices"
    );

    Ok(SplitIndices { train, eval, test })
}

/// Rating tables for each partition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetSplit {
    /// Train ratings.
    pub train: Vec<Rating>,
    /// Eval ratings.
    pub eval: Vec<Rating>,
    /// Test ratings.
    pub test: Vec<Rating>,
}

impl DatasetSplit {
    /// Iterate over all three partitions, named.
    pub fn partitions(&self) -> [(&'static str, &[Rating]); 3] {
        [
            ("train", self.train.as_slice()),
            ("eval", self.eval.as_slice()),
            ("test", self.test.as_slice()),
        ]
    }
}

/// Split ratings into train/eval/test tables.
pub fn split_ratings<R: Rng + ?Sized>(
    ratings: &[Rating],
    config: &SplitConfig,
    rng: &mut R,
) -> Result<DatasetSplit> {
    info!(ratings = ratings.len(), "splitting dataset");

    let indices = split_indices(ratings.len(), config, rng)?;
    let pick = |idx: &[usize]| idx.iter().map(|&i| ratings[i]).collect::<Vec<_>>();

    Ok(DatasetSplit {
        train: pick(&indices.train),
        eval: pick(&indices.eval),
        test: pick(&indices.test),
    })
}
