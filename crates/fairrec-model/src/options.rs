//! Options controlling how behavior rows become interactions.

use serde::{Deserialize, Serialize};

/// Source of the interaction events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// One positive interaction per behavior row, keyed on the row's article page.
    #[default]
    Article,
    /// One interaction per in-view article, labelled by whether it was clicked.
    Impressions,
}

/// What to do with interactions whose article has no metadata row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Abort with a schema error.
    #[default]
    Fail,
    /// Drop the interaction and count it.
    Drop,
}

/// Why a row did not make it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MissingUser,
    MissingItem,
    MissingTimestamp,
    OrphanUser,
    OrphanItem,
    MissingArticleId,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingUser => "missing_user",
            Self::MissingItem => "missing_item",
            Self::MissingTimestamp => "missing_timestamp",
            Self::OrphanUser => "orphan_user",
            Self::OrphanItem => "orphan_item",
            Self::MissingArticleId => "missing_article_id",
        }
    }
}

/// Per-reason counts of dropped rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropReport {
    pub missing_user: usize,
    pub missing_item: usize,
    pub missing_timestamp: usize,
    pub orphan_user: usize,
    pub orphan_item: usize,
    pub missing_article_id: usize,
}

impl DropReport {
    pub fn record(&mut self, reason: DropReason) {
        *self.slot(reason) += 1;
    }

    pub fn count(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::MissingUser => self.missing_user,
            DropReason::MissingItem => self.missing_item,
            DropReason::MissingTimestamp => self.missing_timestamp,
            DropReason::OrphanUser => self.orphan_user,
            DropReason::OrphanItem => self.orphan_item,
            DropReason::MissingArticleId => self.missing_article_id,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_user
            + self.missing_item
            + self.missing_timestamp
            + self.orphan_user
            + self.orphan_item
            + self.missing_article_id
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Non-zero counts, in a stable order.
    pub fn entries(&self) -> Vec<(DropReason, usize)> {
        [
            DropReason::MissingUser,
            DropReason::MissingItem,
            DropReason::MissingTimestamp,
            DropReason::OrphanUser,
            DropReason::OrphanItem,
            DropReason::MissingArticleId,
        ]
        .into_iter()
        .map(|reason| (reason, self.count(reason)))
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    pub fn merge(&mut self, other: &DropReport) {
        self.missing_user += other.missing_user;
        self.missing_item += other.missing_item;
        self.missing_timestamp += other.missing_timestamp;
        self.orphan_user += other.orphan_user;
        self.orphan_item += other.orphan_item;
        self.missing_article_id += other.missing_article_id;
    }

    fn slot(&mut self, reason: DropReason) -> &mut usize {
        match reason {
            DropReason::MissingUser => &mut self.missing_user,
            DropReason::MissingItem => &mut self.missing_item,
            DropReason::MissingTimestamp => &mut self.missing_timestamp,
            DropReason::OrphanUser => &mut self.orphan_user,
            DropReason::OrphanItem => &mut self.orphan_item,
            DropReason::MissingArticleId => &mut self.missing_article_id,
        }
    }
}

/// Interaction sources that count the rows they skipped.
///
/// The emitter reads the report after draining the source so the manifest
/// can record it.
pub trait DropAccounting {
    fn drop_report(&self) -> DropReport;
}

impl<T: DropAccounting + ?Sized> DropAccounting for &mut T {
    fn drop_report(&self) -> DropReport {
        (**self).drop_report()
    }
}
