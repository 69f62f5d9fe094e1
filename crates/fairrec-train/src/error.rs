//! Orchestrator error types.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the orchestrator configuration or its inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },

    #[error("unknown sensitive attribute '{name}' (available: {available})")]
    UnknownSensitiveAttribute { name: String, available: String },

    #[error("split ratios must be positive and sum to 1, got {train} + {valid} + {test} = {sum}")]
    SplitRatios {
        train: f64,
        valid: f64,
        test: f64,
        sum: f64,
    },

    #[error("dataset not found: {path} does not exist (run `fairrec normalize` first)")]
    MissingDataset { path: PathBuf },

    #[error("checkpoint not found: {path}")]
    MissingCheckpoint { path: PathBuf },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Failures launching or running the external framework.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write framework config {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render framework config: {source}")]
    Render {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read framework output: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", exit_label(.code))]
    Failed { command: String, code: Option<i32> },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T, E = TrainError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_message_includes_status() {
        let err = TrainError::Failed {
            command: "python run_recbole.py".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "`python run_recbole.py` exited with status 2");
    }

    #[test]
    fn config_error_is_transparent() {
        let err: TrainError = ConfigError::MissingKey { key: "model.name" }.into();
        assert_eq!(err.to_string(), "missing required key 'model.name'");
    }
}
