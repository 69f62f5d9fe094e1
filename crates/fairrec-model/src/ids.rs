//! Dense re-indexing of raw string identifiers.

use std::collections::HashMap;

use crate::error::{EntityKind, Result, SchemaError};

/// Dense integer identifier assigned by an [`IdIndex`].
pub type DenseId = u32;

/// Bijection between raw tokens and contiguous ids `0..len()`.
///
/// Ids are handed out in first-seen order, so the same token sequence always
/// produces the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdIndex {
    ids: HashMap<String, DenseId>,
    tokens: Vec<String>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `token`, assigning the next free id when unseen.
    pub fn insert(&mut self, token: &str) -> DenseId {
        if let Some(id) = self.ids.get(token) {
            return *id;
        }
        let id = self.tokens.len() as DenseId;
        self.ids.insert(token.to_string(), id);
        self.tokens.push(token.to_string());
        id
    }

    pub fn get(&self, token: &str) -> Option<DenseId> {
        self.ids.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.ids.contains_key(token)
    }

    /// Raw token for a dense id.
    pub fn token(&self, id: DenseId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// `(token, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DenseId)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.as_str(), id as DenseId))
    }
}

/// Assigns a contiguous id to each distinct token in first-seen order.
///
/// Fails only when the number of distinct tokens exceeds the [`DenseId`] range.
pub fn build_id_index<I, S>(entity: EntityKind, raw_tokens: I) -> Result<IdIndex>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index = IdIndex::new();
    for token in raw_tokens {
        let token = token.as_ref();
        if !index.contains(token) && index.len() > DenseId::MAX as usize {
            return Err(SchemaError::IndexOverflow {
                entity,
                max: u64::from(DenseId::MAX),
            });
        }
        index.insert(token);
    }
    Ok(index)
}

/// Builds the index from the feature source and verifies that every token
/// referenced by the interaction log is part of it.
///
/// The first interaction token absent from `feature_tokens` is reported as
/// [`SchemaError::OrphanReference`].
pub fn build_id_index_checked<F, FS, R, RS>(
    entity: EntityKind,
    feature_tokens: F,
    interaction_tokens: R,
    source_name: &str,
) -> Result<IdIndex>
where
    F: IntoIterator<Item = FS>,
    FS: AsRef<str>,
    R: IntoIterator<Item = RS>,
    RS: AsRef<str>,
{
    let index = build_id_index(entity, feature_tokens)?;
    if let Some(orphan) = find_orphan(&index, interaction_tokens) {
        return Err(SchemaError::OrphanReference {
            entity,
            token: orphan,
            source_name: source_name.to_string(),
        });
    }
    Ok(index)
}

/// First token not present in `index`, if any.
pub fn find_orphan<R, RS>(index: &IdIndex, tokens: R) -> Option<String>
where
    R: IntoIterator<Item = RS>,
    RS: AsRef<str>,
{
    tokens
        .into_iter()
        .find(|token| !index.contains(token.as_ref()))
        .map(|token| token.as_ref().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_order() {
        let index = build_id_index(EntityKind::User, ["u1", "u2", "u1"]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("u1"), Some(0));
        assert_eq!(index.get("u2"), Some(1));
        assert_eq!(index.token(1), Some("u2"));
    }

    #[test]
    fn checked_reports_orphan() {
        let err = build_id_index_checked(
            EntityKind::Item,
            ["a1", "a2"],
            ["a2", "a3", "a4"],
            "behaviors.parquet",
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::OrphanReference {
                entity: EntityKind::Item,
                token: "a3".to_string(),
                source_name: "behaviors.parquet".to_string(),
            }
        );
    }

    #[test]
    fn checked_accepts_subset() {
        let index =
            build_id_index_checked(EntityKind::Item, ["a1", "a2"], ["a2", "a1"], "log").unwrap();
        assert_eq!(index.get("a1"), Some(0));
        assert_eq!(index.get("a2"), Some(1));
    }
}
