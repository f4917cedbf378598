//! Pipeline configuration.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! { "dataset": "music", "flattening": { "strategy": "fixed_width", "width": 16 } }
//! ```

use crate::algo::adjacency::Flattening;
use crate::algo::split::SplitConfig;
use crate::{DataSource, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Everything [`prepare`](crate::pipeline::prepare) needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root directory holding one sub-directory per dataset.
    pub data_dir: PathBuf,
    /// Dataset name (sub-directory of `data_dir`).
    pub dataset: String,
    /// Adjacency flattening strategy.
    pub flattening: Flattening,
    /// Split ratios.
    pub split: SplitConfig,
    /// Seed for every random draw of a run.
    pub seed: u64,
    /// Read and write the binary cache.
    pub use_cache: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dataset: "movie".to_string(),
            flattening: Flattening::default(),
            split: SplitConfig::default(),
            seed: 42,
            use_cache: true,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Check ratios and width before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.flattening.validate()
    }

    /// Data source described by this config.
    pub fn source(&self) -> DataSource {
        DataSource::new(&self.data_dir, &self.dataset).with_cache(self.use_cache)
    }
}
