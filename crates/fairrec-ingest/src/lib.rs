//! EB-NeRD source ingestion: parquet/CSV loading into typed raw records.

pub mod articles;
pub mod behaviors;
pub mod columns;
pub mod error;
pub mod frame;
pub mod polars_utils;
pub mod sources;

pub use articles::read_articles;
pub use behaviors::{BehaviorReadOptions, read_behaviors};
pub use columns::{ArticleColumns, BehaviorColumns};
pub use error::{IngestError, Result};
pub use frame::{SourceFormat, load_frame};
pub use sources::{SourcePaths, expand_home};
