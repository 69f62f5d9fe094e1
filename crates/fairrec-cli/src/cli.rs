//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use fairrec_model::{InteractionMode, OrphanPolicy};

#[derive(Parser)]
#[command(
    name = "fairrec",
    version,
    about = "EB-NeRD to fairness-aware recommender pipeline",
    long_about = "Normalize the EB-NeRD news dataset into atomic interaction, item and user \
                  files,\nthen train or evaluate fairness-aware recommenders on them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert the raw behavior log and article metadata into atomic files.
    Normalize(NormalizeArgs),

    /// Train a fairness-aware model on the normalized dataset.
    Train(TrainArgs),

    /// Evaluate the saved checkpoint of a trained model.
    Evaluate(EvaluateArgs),

    /// Print the field schema of the emitted files.
    Schema,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Dataset root holding articles.parquet and one directory per split.
    #[arg(long = "data-root", value_name = "DIR", default_value = fairrec_cli::pipeline::DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    /// Split directory to read behaviors from.
    #[arg(long = "split", value_name = "NAME", default_value = "train")]
    pub split: String,

    /// Parent directory of the emitted dataset directory.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "dataset")]
    pub output_dir: PathBuf,

    /// Dataset name; used for the output subdirectory and file stems.
    #[arg(long = "dataset", value_name = "NAME", default_value = "ebnerd")]
    pub dataset: String,

    /// How behavior rows become interactions.
    #[arg(long = "mode", value_enum, default_value = "article")]
    pub mode: ModeArg,

    /// What to do with articles missing from the metadata.
    #[arg(long = "orphans", value_enum, default_value = "fail")]
    pub orphans: OrphanArg,

    /// Read at most this many behavior rows.
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,
}

#[derive(Parser)]
pub struct TrainArgs {
    /// Orchestrator config file.
    #[arg(long = "config", value_name = "PATH", default_value = fairrec_train::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Render the framework config and print the command without launching it.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct EvaluateArgs {
    /// Orchestrator config file.
    #[arg(long = "config", value_name = "PATH", default_value = fairrec_train::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

/// CLI interaction mode choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// One positive interaction per viewed article page.
    Article,
    /// One interaction per in-view article, labelled by click.
    Impressions,
}

impl From<ModeArg> for InteractionMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Article => Self::Article,
            ModeArg::Impressions => Self::Impressions,
        }
    }
}

/// CLI orphan policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum OrphanArg {
    Fail,
    Drop,
}

impl From<OrphanArg> for OrphanPolicy {
    fn from(value: OrphanArg) -> Self {
        match value {
            OrphanArg::Fail => Self::Fail,
            OrphanArg::Drop => Self::Drop,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn normalize_defaults() {
        let cli = Cli::try_parse_from(["fairrec", "normalize"]).unwrap();
        let Command::Normalize(args) = cli.command else {
            panic!("expected normalize");
        };
        assert_eq!(args.data_root, PathBuf::from("~/dataset/ebnerd_small"));
        assert_eq!(args.split, "train");
        assert_eq!(args.output_dir, PathBuf::from("dataset"));
        assert_eq!(args.dataset, "ebnerd");
        assert!(matches!(args.mode, ModeArg::Article));
        assert!(matches!(args.orphans, OrphanArg::Fail));
        assert_eq!(args.max_rows, None);
    }

    #[test]
    fn train_flags() {
        let cli = Cli::try_parse_from([
            "fairrec",
            "--log-format",
            "json",
            "train",
            "--config",
            "exp.toml",
            "--dry-run",
        ])
        .unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.config, PathBuf::from("exp.toml"));
        assert!(args.dry_run);
        assert!(matches!(cli.log_format, LogFormatArg::Json));
    }
}
