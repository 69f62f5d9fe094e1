//! Normalization pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Discover**: Resolve the behavior log and article metadata files
//! 2. **Ingest**: Read both sources into typed raw records
//! 3. **Prepare**: Build id indexes and feature tables, enforce the orphan policy
//! 4. **Emit**: Stream interactions and write the atomic files plus manifest
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use fairrec_ingest::{
    ArticleColumns, BehaviorColumns, BehaviorReadOptions, SourcePaths, expand_home,
    read_articles, read_behaviors,
};
use fairrec_model::{InteractionMode, OrphanPolicy, RawArticle, RawBehavior};
use fairrec_output::{DatasetManifest, EmitOptions, emit_tables};
use fairrec_transform::{NormalizeOptions, PreparedDataset, prepare_dataset};

/// Default EB-NeRD data root.
pub const DEFAULT_DATA_ROOT: &str = "~/dataset/ebnerd_small";

/// Everything the normalizer needs; no process-wide state is consulted.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    pub data_root: PathBuf,
    pub split: String,
    pub output_dir: PathBuf,
    pub dataset: String,
    pub mode: InteractionMode,
    pub orphans: OrphanPolicy,
    pub max_rows: Option<usize>,
    pub separator: char,
    pub behavior_columns: BehaviorColumns,
    pub article_columns: ArticleColumns,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            split: "train".to_string(),
            output_dir: PathBuf::from("dataset"),
            dataset: "ebnerd".to_string(),
            mode: InteractionMode::default(),
            orphans: OrphanPolicy::default(),
            max_rows: None,
            separator: '\t',
            behavior_columns: BehaviorColumns::default(),
            article_columns: ArticleColumns::default(),
        }
    }
}

// ============================================================================
// Stage 1-2: Discover + Ingest
// ============================================================================

/// Raw records read from the sources.
#[derive(Debug)]
pub struct IngestResult {
    pub sources: SourcePaths,
    pub behaviors: Vec<RawBehavior>,
    pub articles: Vec<RawArticle>,
}

/// Locate and read the behavior log and article metadata.
pub fn ingest(config: &NormalizeConfig) -> Result<IngestResult> {
    let span = info_span!("ingest", split = %config.split);
    let _guard = span.enter();
    let start = Instant::now();

    let root = expand_home(&config.data_root);
    let sources = SourcePaths::discover(&root, &config.split)
        .with_context(|| format!("locate sources under {}", root.display()))?;

    let articles = read_articles(&sources.articles, &config.article_columns)
        .with_context(|| format!("read {}", sources.articles.display()))?;
    let behavior_options = BehaviorReadOptions {
        columns: config.behavior_columns.clone(),
        mode: config.mode,
        max_rows: config.max_rows,
    };
    let behaviors = read_behaviors(&sources.behaviors, &behavior_options)
        .with_context(|| format!("read {}", sources.behaviors.display()))?;

    info!(
        behaviors = behaviors.len(),
        articles = articles.len(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(IngestResult {
        sources,
        behaviors,
        articles,
    })
}

// ============================================================================
// Stage 3: Prepare
// ============================================================================

pub fn prepare(config: &NormalizeConfig, ingested: &IngestResult) -> Result<PreparedDataset> {
    info_span!("prepare").in_scope(|| -> Result<PreparedDataset> {
        let start = Instant::now();
        let options = NormalizeOptions {
            mode: config.mode,
            orphans: config.orphans,
        };
        let behaviors_source = ingested
            .sources
            .behaviors
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prepared = prepare_dataset(
            &ingested.behaviors,
            &ingested.articles,
            options,
            &behaviors_source,
        )
        .context("prepare dataset")?;
        info!(
            users = prepared.user_features.len(),
            items = prepared.item_features.len(),
            duration_ms = start.elapsed().as_millis(),
            "prepare complete"
        );
        Ok(prepared)
    })
}

// ============================================================================
// Stage 4: Emit
// ============================================================================

/// Outcome of a full normalization run.
#[derive(Debug, Clone)]
pub struct NormalizeResult {
    pub dataset_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: DatasetManifest,
    pub sources: SourcePaths,
    pub behavior_rows: usize,
    pub article_rows: usize,
}

pub fn emit(
    config: &NormalizeConfig,
    ingested: &IngestResult,
    prepared: &PreparedDataset,
) -> Result<NormalizeResult> {
    let span = info_span!("emit", dataset = %config.dataset);
    let _guard = span.enter();
    let start = Instant::now();

    let options = EmitOptions {
        dataset: config.dataset.clone(),
        separator: config.separator,
        feature_drops: prepared.feature_drops.clone(),
    };
    let stream = prepared.interactions(&ingested.behaviors);
    let summary = emit_tables(
        &mut stream.iter(),
        &prepared.item_features,
        &prepared.user_features,
        &config.output_dir,
        &options,
    )
    .with_context(|| format!("write dataset to {}", config.output_dir.display()))?;

    info!(
        dir = %summary.dataset_dir.display(),
        duration_ms = start.elapsed().as_millis(),
        "emit complete"
    );
    Ok(NormalizeResult {
        dataset_dir: summary.dataset_dir,
        manifest_path: summary.manifest_path,
        manifest: summary.manifest,
        sources: ingested.sources.clone(),
        behavior_rows: ingested.behaviors.len(),
        article_rows: ingested.articles.len(),
    })
}

/// Runs all stages.
pub fn run_normalize(config: &NormalizeConfig) -> Result<NormalizeResult> {
    let span = info_span!("normalize", dataset = %config.dataset, mode = ?config.mode);
    let _guard = span.enter();
    let start = Instant::now();

    let ingested = ingest(config)?;
    let prepared = prepare(config, &ingested)?;
    let result = emit(config, &ingested, &prepared)?;

    info!(
        dropped = result.manifest.dropped.total(),
        duration_ms = start.elapsed().as_millis(),
        "normalize complete"
    );
    Ok(result)
}
