//! Launching the framework and streaming its output.

use std::io::{BufRead, BufReader, Read};
use std::process::{ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use serde_json::Value;

use crate::config::TrainConfig;
use crate::error::{Result, TrainError};
use crate::framework::{
    FrameworkCommand, RunKind, absolute, framework_config, write_framework_config,
};
use crate::metrics::{MetricParser, MetricReport};

/// Everything needed to launch a run, computed without side effects.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub kind: RunKind,
    pub document: Value,
    pub command: FrameworkCommand,
}

/// Outcome of a framework run that exited successfully.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub kind: RunKind,
    pub command: String,
    pub metrics: MetricReport,
    pub lines: usize,
    pub duration_ms: u128,
}

/// Validates inputs and assembles the training run.
pub fn plan_training(config: &TrainConfig) -> Result<RunPlan> {
    config.check_dataset()?;
    plan(config, RunKind::Train)
}

/// Validates inputs and assembles the evaluation of the saved checkpoint.
pub fn plan_evaluation(config: &TrainConfig) -> Result<RunPlan> {
    config.check_dataset()?;
    config.check_checkpoint()?;
    plan(config, RunKind::Evaluate)
}

fn plan(config: &TrainConfig, kind: RunKind) -> Result<RunPlan> {
    let document = framework_config(config)?;
    let config_file = absolute(&config.framework_config_path())?;
    let command = FrameworkCommand::assemble(config, kind, &config_file);
    Ok(RunPlan {
        kind,
        document,
        command,
    })
}

/// Writes the framework config and runs the planned command to completion.
pub fn execute(config: &TrainConfig, plan: &RunPlan) -> Result<RunOutcome> {
    write_framework_config(config, &plan.document)?;
    run_command(plan.kind, &plan.command)
}

/// Runs `command`, logging each output line and collecting metrics.
///
/// A non-zero exit status is an error.
pub fn run_command(kind: RunKind, command: &FrameworkCommand) -> Result<RunOutcome> {
    let command_line = command.display();
    let span = tracing::info_span!("framework", kind = kind.as_str(), command = %command_line);
    let _guard = span.enter();
    let start = Instant::now();

    tracing::info!(dir = %command.working_dir.display(), "launching framework");
    let mut child = command
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| TrainError::Launch {
            program: command.program.clone(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (metrics, lines, read_error) = collect_output(stdout, stderr);

    let status = child
        .wait()
        .map_err(|source| TrainError::Output { source })?;
    if let Some(source) = read_error {
        return Err(TrainError::Output { source });
    }
    let duration_ms = start.elapsed().as_millis();
    check_status(&command_line, status)?;

    tracing::info!(lines, duration_ms, "framework finished");
    Ok(RunOutcome {
        kind,
        command: command_line,
        metrics,
        lines,
        duration_ms,
    })
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Reads both pipes to the end, interleaving lines in arrival order.
fn collect_output(
    stdout: Option<impl Read + Send>,
    stderr: Option<impl Read + Send>,
) -> (MetricReport, usize, Option<std::io::Error>) {
    let (sender, receiver) = mpsc::channel::<(Stream, std::io::Result<String>)>();
    let mut parser = MetricParser::new();
    let mut lines = 0usize;
    let mut read_error = None;

    thread::scope(|scope| {
        if let Some(pipe) = stdout {
            let sender = sender.clone();
            scope.spawn(move || forward_lines(pipe, Stream::Stdout, &sender));
        }
        if let Some(pipe) = stderr {
            let sender = sender.clone();
            scope.spawn(move || forward_lines(pipe, Stream::Stderr, &sender));
        }
        drop(sender);

        for (stream, line) in receiver {
            match line {
                Ok(line) => {
                    lines += 1;
                    log_line(stream, &line);
                    if let Some(section) = parser.feed(&line) {
                        tracing::debug!(%section, "captured metrics");
                    }
                }
                Err(error) => {
                    read_error.get_or_insert(error);
                }
            }
        }
    });

    (parser.finish(), lines, read_error)
}

fn forward_lines(
    pipe: impl Read,
    stream: Stream,
    sender: &mpsc::Sender<(Stream, std::io::Result<String>)>,
) {
    for line in BufReader::new(pipe).lines() {
        let failed = line.is_err();
        if sender.send((stream, line)).is_err() || failed {
            break;
        }
    }
}

fn log_line(stream: Stream, line: &str) {
    match stream {
        Stream::Stdout => tracing::info!(target: "fairrec_train::framework", "{line}"),
        Stream::Stderr => tracing::info!(target: "fairrec_train::framework", stream = "stderr", "{line}"),
    }
}

fn check_status(command: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    tracing::error!(code = ?status.code(), "framework exited unsuccessfully");
    Err(TrainError::Failed {
        command: command.to_string(),
        code: status.code(),
    })
}
