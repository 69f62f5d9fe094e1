//! Typed records, atomic-file schema, and dense id indexing for the
//! EB-NeRD normalizer.

pub mod error;
pub mod ids;
pub mod options;
pub mod records;
pub mod schema;

pub use error::{EntityKind, Result, SchemaError};
pub use ids::{DenseId, IdIndex, build_id_index, build_id_index_checked, find_orphan};
pub use options::{DropAccounting, DropReason, DropReport, InteractionMode, OrphanPolicy};
pub use records::{
    ItemFeature, NormalizedInteraction, RawArticle, RawBehavior, RawTimestamp, TimeUnit,
    UserFeature,
};
pub use schema::{
    AtomicRow, FieldSpec, FieldType, ITEM_ID_FIELD, LABEL_FIELD, TIME_FIELD, TableKind,
    USER_ID_FIELD, format_numeric,
};
