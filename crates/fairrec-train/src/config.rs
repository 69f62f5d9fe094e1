//! Orchestrator configuration (`fairrec.toml`).
//!
//! ```toml
//! [dataset]
//! name = "ebnerd"
//! data_path = "dataset"
//!
//! [model]
//! name = "FOCF"
//! filter_mode = "concat"
//! sst_attr_list = ["gender"]
//!
//! [split]
//! train = 0.8
//! valid = 0.1
//! test = 0.1
//!
//! [framework]
//! python = "python3"
//! working_dir = "RecBole-FairRec"
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fairrec_model::{ITEM_ID_FIELD, TableKind, USER_ID_FIELD};

use crate::error::ConfigError;

/// Default config location, relative to the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "fairrec.toml";

const SPLIT_TOLERANCE: f64 = 1e-6;

/// Complete orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    pub dataset: DatasetSection,
    pub model: ModelSection,
    pub split: SplitSection,
    pub train: TrainSection,
    pub framework: FrameworkSection,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetSection {
    pub name: String,
    /// Directory holding `<name>/<name>.inter` and friends.
    pub data_path: PathBuf,
    pub separator: char,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            name: "ebnerd".to_string(),
            data_path: PathBuf::from("dataset"),
            separator: '\t',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub name: String,
    /// Fairness objective, passed to the framework as-is.
    pub filter_mode: Option<String>,
    pub sst_attr_list: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitSection {
    pub train: f64,
    pub valid: f64,
    pub test: f64,
}

impl Default for SplitSection {
    fn default() -> Self {
        Self {
            train: 0.8,
            valid: 0.1,
            test: 0.1,
        }
    }
}

impl SplitSection {
    pub fn ratios(&self) -> [f64; 3] {
        [self.train, self.valid, self.test]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainSection {
    pub epochs: u32,
    pub learning_rate: f64,
    pub train_batch_size: u32,
    pub eval_batch_size: u32,
    pub seed: u64,
    pub reproducibility: bool,
    pub valid_metric: String,
    pub metrics: Vec<String>,
    pub topk: Vec<u32>,
}

impl Default for TrainSection {
    fn default() -> Self {
        Self {
            epochs: 300,
            learning_rate: 0.001,
            train_batch_size: 2048,
            eval_batch_size: 4096,
            seed: 2020,
            reproducibility: true,
            valid_metric: "NDCG@10".to_string(),
            metrics: vec!["Recall".to_string(), "NDCG".to_string()],
            topk: vec![10],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameworkSection {
    pub python: String,
    pub entry: PathBuf,
    pub resume: PathBuf,
    /// Working directory of the framework process; checkpoints live under it.
    pub working_dir: PathBuf,
    /// Extra keys copied verbatim into the framework config.
    pub params: toml::Table,
}

impl Default for FrameworkSection {
    fn default() -> Self {
        Self {
            python: "python".to_string(),
            entry: PathBuf::from("run_recbole.py"),
            resume: PathBuf::from("resume_run_recbole.py"),
            working_dir: PathBuf::from("."),
            params: toml::Table::new(),
        }
    }
}

impl TrainConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;
        tracing::debug!(path = %path.display(), model = %config.model.name, "loaded train config");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Structural checks that do not touch the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.name.trim().is_empty() {
            return Err(ConfigError::MissingKey { key: "dataset.name" });
        }
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::MissingKey { key: "model.name" });
        }
        for attribute in &self.model.sst_attr_list {
            validate_sensitive_attribute(attribute)?;
        }
        self.validate_split()?;
        self.validate_train()?;
        if self.framework.python.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "framework.python",
            });
        }
        Ok(())
    }

    fn validate_split(&self) -> Result<(), ConfigError> {
        let SplitSection { train, valid, test } = self.split;
        let sum = train + valid + test;
        let positive = self
            .split
            .ratios()
            .iter()
            .all(|ratio| ratio.is_finite() && *ratio > 0.0);
        if !positive || (sum - 1.0).abs() > SPLIT_TOLERANCE {
            return Err(ConfigError::SplitRatios {
                train,
                valid,
                test,
                sum,
            });
        }
        Ok(())
    }

    fn validate_train(&self) -> Result<(), ConfigError> {
        let train = &self.train;
        if train.epochs == 0 {
            return Err(ConfigError::invalid("train.epochs", "must be at least 1"));
        }
        if !(train.learning_rate.is_finite() && train.learning_rate > 0.0) {
            return Err(ConfigError::invalid(
                "train.learning_rate",
                format!("must be a positive number, got {}", train.learning_rate),
            ));
        }
        if train.train_batch_size == 0 {
            return Err(ConfigError::invalid("train.train_batch_size", "must be at least 1"));
        }
        if train.eval_batch_size == 0 {
            return Err(ConfigError::invalid("train.eval_batch_size", "must be at least 1"));
        }
        if train.topk.is_empty() || train.topk.contains(&0) {
            return Err(ConfigError::invalid(
                "train.topk",
                "must list at least one positive cutoff",
            ));
        }
        if train.valid_metric.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "train.valid_metric",
            });
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.dataset.data_path)
    }

    pub fn working_dir(&self) -> PathBuf {
        self.resolve(&self.framework.working_dir)
    }

    /// `<data_path>/<dataset>/<dataset>.inter`
    pub fn interaction_file(&self) -> PathBuf {
        let name = &self.dataset.name;
        self.data_path()
            .join(name)
            .join(TableKind::Inter.file_name(name))
    }

    /// Framework checkpoint, relative to its working directory:
    /// `saved/saved_<model>/<dataset>_<model>.pth`.
    pub fn checkpoint_relative(&self) -> PathBuf {
        let model = &self.model.name;
        PathBuf::from("saved")
            .join(format!("saved_{model}"))
            .join(format!("{}_{model}.pth", self.dataset.name))
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.working_dir().join(self.checkpoint_relative())
    }

    /// `<dataset>_<model>.yaml` inside the framework working directory.
    pub fn framework_config_path(&self) -> PathBuf {
        self.working_dir()
            .join(format!("{}_{}.yaml", self.dataset.name, self.model.name))
    }

    /// Fails when the normalized dataset has not been emitted yet.
    pub fn check_dataset(&self) -> Result<(), ConfigError> {
        let path = self.interaction_file();
        if path.is_file() {
            Ok(())
        } else {
            Err(ConfigError::MissingDataset { path })
        }
    }

    pub fn check_checkpoint(&self) -> Result<(), ConfigError> {
        let path = self.checkpoint_path();
        if path.is_file() {
            Ok(())
        } else {
            Err(ConfigError::MissingCheckpoint { path })
        }
    }
}

/// Sensitive attributes must be non-id columns of the emitted user or item table.
fn validate_sensitive_attribute(name: &str) -> Result<(), ConfigError> {
    let known = name != USER_ID_FIELD
        && name != ITEM_ID_FIELD
        && (TableKind::User.has_field(name) || TableKind::Item.has_field(name));
    if known {
        return Ok(());
    }
    Err(ConfigError::UnknownSensitiveAttribute {
        name: name.to_string(),
        available: sensitive_candidates().join(", "),
    })
}

/// Columns usable as sensitive attributes, user table first.
pub fn sensitive_candidates() -> Vec<&'static str> {
    TableKind::User
        .field_names()
        .chain(TableKind::Item.field_names())
        .filter(|name| *name != USER_ID_FIELD && *name != ITEM_ID_FIELD)
        .collect()
}
