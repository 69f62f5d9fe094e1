//! Dataset preparation: feature tables, id indexes and the orphan check.
//!
//! The stages run in order:
//! 1. **Items**: index article ids in file order and build item features
//! 2. **Users**: index user ids in behavior-log order and build user features
//! 3. **Orphans**: verify every referenced article has metadata (fail policy)
//! 4. **Interactions**: a lazy stream over the behavior rows
//!
//! Only stage 4 touches the interaction rows row-by-row; it is left lazy so
//! the emitter can consume it in a single pass.

use serde::{Deserialize, Serialize};

use fairrec_model::{
    DropReport, EntityKind, IdIndex, InteractionMode, ItemFeature, OrphanPolicy, RawArticle,
    RawBehavior, Result, SchemaError, UserFeature, find_orphan,
};

use crate::features::{build_item_features, build_user_features};
use crate::interactions::{InteractionStream, normalize_interactions};

/// Options for the normalization stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub mode: InteractionMode,
    pub orphans: OrphanPolicy,
}

/// Indexes and feature tables derived from the raw sources.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub users: IdIndex,
    pub items: IdIndex,
    pub user_features: Vec<UserFeature>,
    pub item_features: Vec<ItemFeature>,
    /// Drops that happened while building the feature tables.
    pub feature_drops: DropReport,
    pub options: NormalizeOptions,
}

impl PreparedDataset {
    /// Lazy interaction stream over `behaviors` using this dataset's indexes.
    pub fn interactions<'a>(&'a self, behaviors: &'a [RawBehavior]) -> InteractionStream<'a> {
        normalize_interactions(behaviors, &self.users, &self.items, self.options.mode)
    }
}

/// Builds indexes and feature tables, enforcing the orphan policy.
///
/// `behaviors_source` names the behavior log in orphan errors.
pub fn prepare_dataset(
    behaviors: &[RawBehavior],
    articles: &[RawArticle],
    options: NormalizeOptions,
    behaviors_source: &str,
) -> Result<PreparedDataset> {
    let items = build_item_features(articles)?;
    let users = build_user_features(behaviors)?;

    if options.orphans == OrphanPolicy::Fail
        && let Some(token) = find_orphan(&items.index, referenced_items(behaviors, options.mode))
    {
        return Err(SchemaError::OrphanReference {
            entity: EntityKind::Item,
            token,
            source_name: behaviors_source.to_string(),
        });
    }

    tracing::info!(
        users = users.index.len(),
        items = items.index.len(),
        mode = ?options.mode,
        "indexed users and items"
    );

    let mut feature_drops = items.dropped;
    feature_drops.merge(&users.dropped);

    Ok(PreparedDataset {
        users: users.index,
        items: items.index,
        user_features: users.rows,
        item_features: items.rows,
        feature_drops,
        options,
    })
}

fn referenced_items(
    behaviors: &[RawBehavior],
    mode: InteractionMode,
) -> Box<dyn Iterator<Item = &str> + '_> {
    match mode {
        InteractionMode::Article => Box::new(
            behaviors
                .iter()
                .filter_map(|row| row.article.as_deref()),
        ),
        InteractionMode::Impressions => Box::new(
            behaviors
                .iter()
                .flat_map(|row| row.inview.iter().map(String::as_str)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairrec_model::RawTimestamp;

    fn behavior(user: &str, article: &str) -> RawBehavior {
        RawBehavior {
            user: Some(user.to_string()),
            article: Some(article.to_string()),
            timestamp: Some(RawTimestamp::Epoch(1)),
            ..RawBehavior::default()
        }
    }

    fn article(id: &str) -> RawArticle {
        RawArticle {
            article: Some(id.to_string()),
            ..RawArticle::default()
        }
    }

    #[test]
    fn fail_policy_rejects_orphan() {
        let behaviors = vec![behavior("u1", "a1"), behavior("u1", "a9")];
        let articles = vec![article("a1")];
        let err = prepare_dataset(
            &behaviors,
            &articles,
            NormalizeOptions::default(),
            "behaviors.parquet",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::OrphanReference { ref token, .. } if token == "a9"));
    }

    #[test]
    fn drop_policy_counts_orphan() {
        let behaviors = vec![behavior("u1", "a1"), behavior("u1", "a9")];
        let articles = vec![article("a1")];
        let options = NormalizeOptions {
            orphans: OrphanPolicy::Drop,
            ..NormalizeOptions::default()
        };
        let prepared = prepare_dataset(&behaviors, &articles, options, "behaviors").unwrap();
        let stream = prepared.interactions(&behaviors);
        let mut iter = stream.iter();
        assert_eq!(iter.by_ref().count(), 1);
        assert_eq!(iter.report().orphan_item, 1);
    }
}
