//! Framework config rendering and command assembly.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{Map, Value, json};

use fairrec_model::{ITEM_ID_FIELD, TIME_FIELD, TableKind, USER_ID_FIELD};

use crate::config::TrainConfig;
use crate::error::{ConfigError, Result, TrainError};

/// Keys written by the orchestrator; passthrough parameters may not override them.
const MANAGED_KEYS: &[&str] = &[
    "data_path",
    "dataset",
    "model",
    "field_separator",
    "USER_ID_FIELD",
    "ITEM_ID_FIELD",
    "TIME_FIELD",
    "load_col",
    "sst_attr_list",
    "filter_mode",
    "eval_args",
    "epochs",
    "learning_rate",
    "train_batch_size",
    "eval_batch_size",
    "seed",
    "reproducibility",
    "valid_metric",
    "metrics",
    "topk",
    "checkpoint_dir",
];

/// Builds the framework config document.
///
/// The document is JSON, which the framework's YAML loader accepts as-is.
pub fn framework_config(config: &TrainConfig) -> Result<Value> {
    let data_path = absolute(&config.data_path())?;
    let train = &config.train;

    let load_col: Map<String, Value> = TableKind::ALL
        .iter()
        .map(|table| {
            let fields: Vec<&str> = table.field_names().collect();
            (table.extension().to_string(), json!(fields))
        })
        .collect();

    let mut document = json!({
        "data_path": data_path.to_string_lossy(),
        "dataset": config.dataset.name,
        "model": config.model.name,
        "field_separator": config.dataset.separator.to_string(),
        "USER_ID_FIELD": USER_ID_FIELD,
        "ITEM_ID_FIELD": ITEM_ID_FIELD,
        "TIME_FIELD": TIME_FIELD,
        "load_col": load_col,
        "sst_attr_list": config.model.sst_attr_list,
        "eval_args": { "split": { "RS": config.split.ratios() } },
        "epochs": train.epochs,
        "learning_rate": train.learning_rate,
        "train_batch_size": train.train_batch_size,
        "eval_batch_size": train.eval_batch_size,
        "seed": train.seed,
        "reproducibility": train.reproducibility,
        "valid_metric": train.valid_metric,
        "metrics": train.metrics,
        "topk": train.topk,
        "checkpoint_dir": format!("saved/saved_{}", config.model.name),
    });

    if let Some(object) = document.as_object_mut() {
        if let Some(filter_mode) = &config.model.filter_mode {
            object.insert("filter_mode".to_string(), json!(filter_mode));
        }
        for (key, value) in &config.framework.params {
            if MANAGED_KEYS.contains(&key.as_str()) {
                return Err(ConfigError::invalid(
                    format!("framework.params.{key}"),
                    "overrides a key managed by the orchestrator",
                )
                .into());
            }
            let value =
                serde_json::to_value(value).map_err(|source| TrainError::Render { source })?;
            object.insert(key.clone(), value);
        }
    }

    Ok(document)
}

/// Writes the rendered config to [`TrainConfig::framework_config_path`].
pub fn write_framework_config(config: &TrainConfig, document: &Value) -> Result<PathBuf> {
    let path = config.framework_config_path();
    let mut bytes =
        serde_json::to_vec_pretty(document).map_err(|source| TrainError::Render { source })?;
    bytes.push(b'\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| TrainError::WriteConfig {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, bytes).map_err(|source| TrainError::WriteConfig {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote framework config");
    Ok(path)
}

/// Which framework script to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Train,
    Evaluate,
}

impl RunKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Evaluate => "evaluate",
        }
    }
}

/// A fully assembled framework invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
}

impl FrameworkCommand {
    /// `<python> <script> --model=<m> --dataset=<d> --config_files=<yaml>`
    pub fn assemble(config: &TrainConfig, kind: RunKind, config_file: &Path) -> Self {
        let script = match kind {
            RunKind::Train => &config.framework.entry,
            RunKind::Evaluate => &config.framework.resume,
        };
        let mut config_files = OsString::from("--config_files=");
        config_files.push(config_file);
        Self {
            program: config.framework.python.clone(),
            args: vec![
                script.clone().into_os_string(),
                OsString::from(format!("--model={}", config.model.name)),
                OsString::from(format!("--dataset={}", config.dataset.name)),
                config_files,
            ],
            working_dir: config.working_dir(),
        }
    }

    /// Shell-like rendering for logs and dry runs.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.working_dir);
        command
    }
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}
