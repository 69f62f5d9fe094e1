//! Staged, atomic emission of the three tables and the manifest.
//!
//! A complete `<dataset>` directory is first built inside a hidden staging
//! directory next to the target. Once every file is written and synced, the
//! previous dataset directory is moved aside and the staged one renamed into
//! its place. If that rename fails the previous directory is moved back, so
//! the target always holds one complete emission.

use std::fs;
use std::path::{Path, PathBuf};

use fairrec_model::{
    DropAccounting, DropReport, ItemFeature, NormalizedInteraction, TableKind, UserFeature,
};

use crate::error::{OutputError, Result};
use crate::manifest::DatasetManifest;
use crate::table::{delimiter_byte, write_table};

const STAGING_PREFIX: &str = ".fairrec-staging-";
/// Parking spot for the replaced dataset directory inside the staging dir.
const PREVIOUS_DIR: &str = ".previous";

/// Options for [`emit_tables`].
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Dataset name; used for the subdirectory and every file stem.
    pub dataset: String,
    pub separator: char,
    /// Drops recorded before emission (feature tables), merged into the manifest.
    pub feature_drops: DropReport,
}

impl EmitOptions {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            separator: '\t',
            feature_drops: DropReport::default(),
        }
    }
}

/// Result of a successful emission.
#[derive(Debug, Clone)]
pub struct EmitSummary {
    pub dataset_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: DatasetManifest,
}

impl EmitSummary {
    pub fn path(&self, table: TableKind) -> PathBuf {
        self.dataset_dir.join(table.file_name(&self.manifest.dataset))
    }
}

/// `<output_dir>/<dataset>`
pub fn dataset_dir(output_dir: &Path, dataset: &str) -> PathBuf {
    output_dir.join(dataset)
}

/// Writes `<dataset>.inter`, `.item`, `.user` and `<dataset>.manifest.json`.
///
/// The interaction source is drained exactly once; its drop report is read
/// afterwards and recorded in the manifest.
pub fn emit_tables<I>(
    interactions: I,
    item_features: &[ItemFeature],
    user_features: &[UserFeature],
    output_dir: &Path,
    options: &EmitOptions,
) -> Result<EmitSummary>
where
    I: IntoIterator<Item = NormalizedInteraction>,
    I::IntoIter: DropAccounting,
{
    validate_dataset_name(&options.dataset)?;
    delimiter_byte(options.separator)?;

    fs::create_dir_all(output_dir).map_err(|source| OutputError::NotWritable {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(output_dir)
        .map_err(|source| OutputError::NotWritable {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let dataset = options.dataset.as_str();
    let staged_dir = staging.path().join(dataset);
    fs::create_dir(&staged_dir).map_err(|e| OutputError::io("create", &staged_dir, e))?;
    let stage = |table: TableKind| staged_dir.join(table.file_name(dataset));

    let mut interactions = interactions.into_iter();
    let inter = write_table(
        &stage(TableKind::Inter),
        TableKind::Inter,
        interactions.by_ref(),
        options.separator,
    )?;
    let mut dropped = options.feature_drops.clone();
    dropped.merge(&interactions.drop_report());

    let item = write_table(
        &stage(TableKind::Item),
        TableKind::Item,
        item_features.iter().cloned(),
        options.separator,
    )?;
    let user = write_table(
        &stage(TableKind::User),
        TableKind::User,
        user_features.iter().cloned(),
        options.separator,
    )?;

    let manifest = DatasetManifest {
        dataset: dataset.to_string(),
        separator: options.separator.to_string(),
        tables: vec![inter, item, user],
        dropped,
    };
    let manifest_name = DatasetManifest::file_name(dataset);
    write_synced(&staged_dir.join(&manifest_name), &manifest.to_bytes()?)?;

    let target_dir = dataset_dir(output_dir, dataset);
    replace_dir(
        &staged_dir,
        &target_dir,
        &staging.path().join(PREVIOUS_DIR),
    )?;

    tracing::info!(
        dataset,
        dir = %target_dir.display(),
        interactions = manifest.tables[0].rows,
        items = manifest.tables[1].rows,
        users = manifest.tables[2].rows,
        dropped = manifest.dropped.total(),
        "emitted dataset"
    );

    Ok(EmitSummary {
        manifest_path: target_dir.join(&manifest_name),
        dataset_dir: target_dir,
        manifest,
    })
}

fn validate_dataset_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_whitespace);
    if invalid {
        return Err(OutputError::InvalidDatasetName(name.to_string()));
    }
    Ok(())
}

/// Renames `staged` to `target`, parking any existing `target` at `backup`.
///
/// On failure the parked directory is restored. The caller removes `backup`.
fn replace_dir(staged: &Path, target: &Path, backup: &Path) -> Result<()> {
    let had_previous = match fs::symlink_metadata(target) {
        Ok(metadata) if metadata.is_dir() => true,
        Ok(_) => {
            return Err(OutputError::NotWritable {
                path: target.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "target exists and is not a directory",
                ),
            });
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => false,
        Err(error) => return Err(OutputError::io("inspect", target, error)),
    };

    if had_previous {
        fs::rename(target, backup).map_err(|source| OutputError::AtomicRename {
            temp_path: target.to_path_buf(),
            target_path: backup.to_path_buf(),
            source,
        })?;
    }

    if let Err(source) = fs::rename(staged, target) {
        if had_previous && let Err(error) = fs::rename(backup, target) {
            tracing::error!(
                previous = %backup.display(),
                target = %target.display(),
                %error,
                "could not restore previous dataset directory"
            );
        }
        return Err(OutputError::AtomicRename {
            temp_path: staged.to_path_buf(),
            target_path: target.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut file = fs::File::create(path).map_err(|e| OutputError::io("create", path, e))?;
    file.write_all(bytes)
        .map_err(|e| OutputError::io("write", path, e))?;
    file.sync_all().map_err(|e| OutputError::io("sync", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_name_rules() {
        assert!(validate_dataset_name("ebnerd").is_ok());
        assert!(validate_dataset_name("ebnerd_small").is_ok());
        assert!(validate_dataset_name("").is_err());
        assert!(validate_dataset_name("../x").is_err());
        assert!(validate_dataset_name(".hidden").is_err());
        assert!(validate_dataset_name("a b").is_err());
    }

    #[test]
    fn failed_swap_restores_previous_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("ebnerd");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("ebnerd.inter"), "OLD\n").unwrap();
        let backup = dir.path().join(PREVIOUS_DIR);

        let err = replace_dir(&dir.path().join("never-staged"), &target, &backup).unwrap_err();

        assert!(matches!(err, OutputError::AtomicRename { .. }));
        assert_eq!(fs::read_to_string(target.join("ebnerd.inter")).unwrap(), "OLD\n");
        assert!(!backup.exists());
    }

    #[test]
    fn swap_replaces_whole_directory() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged");
        fs::create_dir(&staged).unwrap();
        fs::write(staged.join("ebnerd.inter"), "NEW\n").unwrap();
        let target = dir.path().join("ebnerd");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("ebnerd.inter"), "OLD\n").unwrap();
        fs::write(target.join("ebnerd.item"), "OLD\n").unwrap();
        let backup = dir.path().join(PREVIOUS_DIR);

        replace_dir(&staged, &target, &backup).unwrap();

        assert_eq!(fs::read_to_string(target.join("ebnerd.inter")).unwrap(), "NEW\n");
        assert!(!target.join("ebnerd.item").exists());
        assert_eq!(fs::read_to_string(backup.join("ebnerd.item")).unwrap(), "OLD\n");
        assert!(!staged.exists());
    }

    #[test]
    fn swap_refuses_regular_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged");
        fs::create_dir(&staged).unwrap();
        let target = dir.path().join("ebnerd");
        fs::write(&target, "keep").unwrap();

        let err = replace_dir(&staged, &target, &dir.path().join(PREVIOUS_DIR)).unwrap_err();

        assert!(matches!(err, OutputError::NotWritable { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep");
    }
}
