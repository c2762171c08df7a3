//! Engine configuration
//!
//! Every option has the default used by the historical file-list layout, so a
//! config only needs a `base_directory`:
//!
//! ```rust
//! use filelist_db::ListConfig;
//!
//! let config = ListConfig::from_json_str(r#"{ "base_directory": "/data/lists" }"#).unwrap();
//! assert_eq!(config.models_filename, "for_models.lst");
//! assert_eq!(config.use_dense_probe_list, None);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::list::ListRole;
use crate::Result;

/// Configuration surface consumed by the engine.
///
/// World filenames are relative to the protocol root and carry their own
/// subdirectory (`norm/train_world.lst`); every other list lives inside the
/// `dev_subdir` or `eval_subdir` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Directory holding the list files (or one subdirectory per protocol)
    pub base_directory: PathBuf,
    /// Protocol used when a query names none
    #[serde(default)]
    pub protocol: Option<String>,
    /// `Some(true)` forces dense probe lists, `Some(false)` sparse score lists,
    /// `None` detects the mode from the files present
    #[serde(default)]
    pub use_dense_probe_list: Option<bool>,
    /// Development group subdirectory
    #[serde(default = "default_dev_subdir")]
    pub dev_subdir: String,
    /// Evaluation group subdirectory
    #[serde(default = "default_eval_subdir")]
    pub eval_subdir: String,
    /// Training list
    #[serde(default = "default_world_filename")]
    pub world_filename: PathBuf,
    /// First optional training list
    #[serde(default = "default_optional_world_1_filename")]
    pub optional_world_1_filename: PathBuf,
    /// Second optional training list
    #[serde(default = "default_optional_world_2_filename")]
    pub optional_world_2_filename: PathBuf,
    /// Model enrollment list
    #[serde(default = "default_models_filename")]
    pub models_filename: String,
    /// Dense probe list
    #[serde(default = "default_probes_filename")]
    pub probes_filename: String,
    /// Sparse score list
    #[serde(default = "default_scores_filename")]
    pub scores_filename: String,
    /// T-norm model list
    #[serde(default = "default_tnorm_filename")]
    pub tnorm_filename: String,
    /// Z-norm sample list
    #[serde(default = "default_znorm_filename")]
    pub znorm_filename: String,
    /// Root of the raw data the sample paths point into
    #[serde(default)]
    pub original_directory: Option<PathBuf>,
    /// Extensions tried, in order, when locating raw data files
    #[serde(default)]
    pub original_extensions: Vec<String>,
}

fn default_dev_subdir() -> String {
    "dev".to_string()
}

fn default_eval_subdir() -> String {
    "eval".to_string()
}

fn default_world_filename() -> PathBuf {
    Path::new("norm").join(ListRole::World.default_filename())
}

fn default_optional_world_1_filename() -> PathBuf {
    Path::new("norm").join(ListRole::OptionalWorld1.default_filename())
}

fn default_optional_world_2_filename() -> PathBuf {
    Path::new("norm").join(ListRole::OptionalWorld2.default_filename())
}

fn default_models_filename() -> String {
    ListRole::Models.default_filename().to_string()
}

fn default_probes_filename() -> String {
    ListRole::Probes.default_filename().to_string()
}

fn default_scores_filename() -> String {
    ListRole::Scores.default_filename().to_string()
}

fn default_tnorm_filename() -> String {
    ListRole::TNorm.default_filename().to_string()
}

fn default_znorm_filename() -> String {
    ListRole::ZNorm.default_filename().to_string()
}

impl ListConfig {
    /// Create a configuration with every option at its default.
    #[must_use]
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            protocol: None,
            use_dense_probe_list: None,
            dev_subdir: default_dev_subdir(),
            eval_subdir: default_eval_subdir(),
            world_filename: default_world_filename(),
            optional_world_1_filename: default_optional_world_1_filename(),
            optional_world_2_filename: default_optional_world_2_filename(),
            models_filename: default_models_filename(),
            probes_filename: default_probes_filename(),
            scores_filename: default_scores_filename(),
            tnorm_filename: default_tnorm_filename(),
            znorm_filename: default_znorm_filename(),
            original_directory: None,
            original_extensions: Vec::new(),
        }
    }

    /// Decode a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the JSON is invalid or lacks `base_directory`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read, or
    /// [`crate::Error::Config`] if it cannot be decoded.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Filename configured for a dev/eval list role.
    ///
    /// World roles return `None`; their location is a path relative to the
    /// protocol root, see [`Self::world_path`].
    #[must_use]
    pub fn group_filename(&self, role: ListRole) -> Option<&str> {
        match role {
            ListRole::Models => Some(&self.models_filename),
            ListRole::Probes => Some(&self.probes_filename),
            ListRole::Scores => Some(&self.scores_filename),
            ListRole::TNorm => Some(&self.tnorm_filename),
            ListRole::ZNorm => Some(&self.znorm_filename),
            ListRole::World | ListRole::OptionalWorld1 | ListRole::OptionalWorld2 => None,
        }
    }

    /// Path of a world list relative to the protocol root.
    #[must_use]
    pub fn world_path(&self, role: ListRole) -> Option<&Path> {
        match role {
            ListRole::World => Some(&self.world_filename),
            ListRole::OptionalWorld1 => Some(&self.optional_world_1_filename),
            ListRole::OptionalWorld2 => Some(&self.optional_world_2_filename),
            _ => None,
        }
    }
}
