//! Schema error types shared by the normalizer crates.

use thiserror::Error;

/// Structural problems with the source data or the emitted schema.
///
/// Row-level malformation is never reported through this type; those rows
/// are dropped and counted in a [`crate::DropReport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A token referenced by the interaction log has no row in its feature source.
    #[error("{entity} '{token}' is referenced by {source_name} but missing from the {entity} features")]
    OrphanReference {
        entity: EntityKind,
        token: String,
        source_name: String,
    },

    /// A required column is absent from a source file.
    #[error("required column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// A column exists but holds values of a type that cannot be interpreted.
    #[error("column '{column}' in {source_name} has unsupported type {found}")]
    UnexpectedColumnType {
        column: String,
        source_name: String,
        found: String,
    },

    /// More distinct tokens than the dense id space can hold.
    #[error("{entity} index overflow: more than {max} distinct tokens")]
    IndexOverflow { entity: EntityKind, max: u64 },
}

/// The two id spaces of the normalized dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Item,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Item => "item",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
