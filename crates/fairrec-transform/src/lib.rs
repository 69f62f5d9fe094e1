//! Interaction normalization and feature-table derivation for EB-NeRD.

pub mod datetime;
pub mod features;
pub mod interactions;
pub mod pipeline;

pub use datetime::to_epoch_seconds;
pub use features::{FeatureTable, build_item_features, build_user_features};
pub use interactions::{InteractionIter, InteractionStream, normalize_interactions};
pub use pipeline::{NormalizeOptions, PreparedDataset, prepare_dataset};
