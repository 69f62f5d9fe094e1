//! Source file discovery under an EB-NeRD data root.
//!
//! The release layout is `<root>/articles.parquet` plus one directory per
//! split holding `behaviors.parquet` (and `history.parquet`, unused here).
//! A CSV file with the same stem is accepted when the parquet file is absent.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

pub const BEHAVIORS_STEM: &str = "behaviors";
pub const ARTICLES_STEM: &str = "articles";

/// Resolved paths of the raw inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub behaviors: PathBuf,
    pub articles: PathBuf,
}

impl SourcePaths {
    /// Locates the behavior log of `split` and the article metadata under `root`.
    ///
    /// Both files must exist; a missing one is fatal before anything is read.
    pub fn discover(root: &Path, split: &str) -> Result<Self> {
        if !root.is_dir() {
            return Err(IngestError::SourceNotFound {
                path: root.to_path_buf(),
            });
        }
        let behaviors = locate(&root.join(split), BEHAVIORS_STEM)?;
        let articles = locate(root, ARTICLES_STEM)?;
        tracing::debug!(
            behaviors = %behaviors.display(),
            articles = %articles.display(),
            "resolved source files"
        );
        Ok(Self {
            behaviors,
            articles,
        })
    }
}

fn locate(dir: &Path, stem: &str) -> Result<PathBuf> {
    let parquet = dir.join(format!("{stem}.parquet"));
    if parquet.is_file() {
        return Ok(parquet);
    }
    let csv = dir.join(format!("{stem}.csv"));
    if csv.is_file() {
        return Ok(csv);
    }
    Err(IngestError::SourceNotFound { path: parquet })
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn prefers_parquet_and_falls_back_to_csv() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("train")).unwrap();
        fs::write(dir.path().join("train/behaviors.csv"), "user_id\n").unwrap();
        fs::write(dir.path().join("articles.parquet"), b"").unwrap();

        let paths = SourcePaths::discover(dir.path(), "train").unwrap();
        assert_eq!(paths.behaviors, dir.path().join("train/behaviors.csv"));
        assert_eq!(paths.articles, dir.path().join("articles.parquet"));
    }

    #[test]
    fn missing_articles_is_fatal() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("train")).unwrap();
        fs::write(dir.path().join("train/behaviors.parquet"), b"").unwrap();

        let err = SourcePaths::discover(dir.path(), "train").unwrap_err();
        match err {
            IngestError::SourceNotFound { path } => {
                assert_eq!(path, dir.path().join("articles.parquet"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home(Path::new("/data/x")), PathBuf::from("/data/x"));
    }
}
