//! Training orchestrator for fairness-aware recommenders.
//!
//! Loads `fairrec.toml`, renders the framework config for the normalized
//! dataset, launches the framework entry point (or its resume script) and
//! collects the metrics it reports.

pub mod config;
pub mod error;
pub mod framework;
pub mod metrics;
pub mod runner;

pub use config::{
    DEFAULT_CONFIG_FILE, DatasetSection, FrameworkSection, ModelSection, SplitSection,
    TrainConfig, TrainSection, sensitive_candidates,
};
pub use error::{ConfigError, Result, TrainError};
pub use framework::{FrameworkCommand, RunKind, framework_config, write_framework_config};
pub use metrics::{MetricMap, MetricParser, MetricReport, MetricSection, parse_metric_pairs};
pub use runner::{RunOutcome, RunPlan, execute, plan_evaluation, plan_training, run_command};
