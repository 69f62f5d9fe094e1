use anyhow::{Context, Result};
use tracing::info_span;

use fairrec_cli::pipeline::{NormalizeConfig, NormalizeResult, run_normalize};
use fairrec_train::{RunOutcome, TrainConfig, execute, plan_evaluation, plan_training};

use crate::cli::{EvaluateArgs, NormalizeArgs, TrainArgs};
use crate::summary::print_plan;

pub fn run_normalize_command(args: &NormalizeArgs) -> Result<NormalizeResult> {
    let config = NormalizeConfig {
        data_root: args.data_root.clone(),
        split: args.split.clone(),
        output_dir: args.output_dir.clone(),
        dataset: args.dataset.clone(),
        mode: args.mode.into(),
        orphans: args.orphans.into(),
        max_rows: args.max_rows,
        ..NormalizeConfig::default()
    };
    run_normalize(&config)
}

/// Outcome of `train`: nothing ran for a dry run.
pub enum TrainResult {
    DryRun,
    Completed(RunOutcome),
}

pub fn run_train(args: &TrainArgs) -> Result<TrainResult> {
    let span = info_span!("train", config = %args.config.display());
    let _guard = span.enter();

    let config = TrainConfig::load(&args.config)
        .with_context(|| format!("load {}", args.config.display()))?;
    let plan = plan_training(&config).context("plan training run")?;

    if args.dry_run {
        let rendered = serde_json::to_string_pretty(&plan.document)
            .context("render framework config")?;
        print_plan(&plan, &rendered);
        return Ok(TrainResult::DryRun);
    }

    let outcome = execute(&config, &plan).context("training run failed")?;
    Ok(TrainResult::Completed(outcome))
}

pub fn run_evaluate(args: &EvaluateArgs) -> Result<RunOutcome> {
    let span = info_span!("evaluate", config = %args.config.display());
    let _guard = span.enter();

    let config = TrainConfig::load(&args.config)
        .with_context(|| format!("load {}", args.config.display()))?;
    let plan = plan_evaluation(&config).context("plan evaluation run")?;
    execute(&config, &plan).context("evaluation run failed")
}
