//! Emission of normalized EB-NeRD tables as framework atomic files.
//!
//! Output layout for a dataset named `ebnerd`:
//!
//! ```text
//! <output_dir>/ebnerd/ebnerd.inter
//! <output_dir>/ebnerd/ebnerd.item
//! <output_dir>/ebnerd/ebnerd.user
//! <output_dir>/ebnerd/ebnerd.manifest.json
//! ```

pub mod digest;
pub mod emit;
pub mod error;
pub mod manifest;
mod table;

pub use digest::{DigestWriter, sha256_hex};
pub use emit::{EmitOptions, EmitSummary, dataset_dir, emit_tables};
pub use error::{OutputError, Result};
pub use manifest::{DatasetManifest, TableManifest};
