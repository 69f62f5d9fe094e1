//! Lazy normalization of behavior rows into interactions.

use std::collections::VecDeque;

use fairrec_model::{
    DenseId, DropAccounting, DropReason, DropReport, IdIndex, InteractionMode,
    NormalizedInteraction, RawBehavior,
};

use crate::datetime::to_epoch_seconds;

/// Restartable view over the interactions derived from a behavior log.
///
/// Nothing is computed until [`InteractionStream::iter`] is consumed; each
/// call starts a fresh pass with its own drop counters.
#[derive(Debug, Clone, Copy)]
pub struct InteractionStream<'a> {
    rows: &'a [RawBehavior],
    users: &'a IdIndex,
    items: &'a IdIndex,
    mode: InteractionMode,
}

/// Builds the interaction stream for `raw_logs` against the given indexes.
pub fn normalize_interactions<'a>(
    raw_logs: &'a [RawBehavior],
    user_index: &'a IdIndex,
    item_index: &'a IdIndex,
    mode: InteractionMode,
) -> InteractionStream<'a> {
    InteractionStream {
        rows: raw_logs,
        users: user_index,
        items: item_index,
        mode,
    }
}

impl<'a> InteractionStream<'a> {
    pub fn iter(&self) -> InteractionIter<'a> {
        InteractionIter {
            stream: *self,
            cursor: 0,
            pending: VecDeque::new(),
            report: DropReport::default(),
            emitted: 0,
        }
    }
}

impl<'a> IntoIterator for &InteractionStream<'a> {
    type Item = NormalizedInteraction;
    type IntoIter = InteractionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over an [`InteractionStream`].
#[derive(Debug)]
pub struct InteractionIter<'a> {
    stream: InteractionStream<'a>,
    cursor: usize,
    pending: VecDeque<NormalizedInteraction>,
    report: DropReport,
    emitted: usize,
}

impl InteractionIter<'_> {
    /// Rows dropped so far in this pass; complete once the iterator is exhausted.
    pub fn report(&self) -> &DropReport {
        &self.report
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn expand(&mut self, row: &RawBehavior) {
        let Some(user_token) = row.user.as_deref() else {
            self.report.record(DropReason::MissingUser);
            return;
        };
        let Some(user_id) = self.stream.users.get(user_token) else {
            self.report.record(DropReason::OrphanUser);
            return;
        };
        let Some(timestamp) = row.timestamp.as_ref().and_then(to_epoch_seconds) else {
            self.report.record(DropReason::MissingTimestamp);
            return;
        };

        match self.stream.mode {
            InteractionMode::Article => {
                let Some(article) = row.article.as_deref() else {
                    self.report.record(DropReason::MissingItem);
                    return;
                };
                if let Some(item_id) = self.item_id(article) {
                    self.push(user_id, item_id, timestamp, 1.0);
                }
            }
            InteractionMode::Impressions => {
                if row.inview.is_empty() {
                    self.report.record(DropReason::MissingItem);
                    return;
                }
                for article in &row.inview {
                    let Some(item_id) = self.item_id(article) else {
                        continue;
                    };
                    let label = if row.clicked.iter().any(|clicked| clicked == article) {
                        1.0
                    } else {
                        0.0
                    };
                    self.push(user_id, item_id, timestamp, label);
                }
            }
        }
    }

    fn item_id(&mut self, token: &str) -> Option<DenseId> {
        let id = self.stream.items.get(token);
        if id.is_none() {
            self.report.record(DropReason::OrphanItem);
        }
        id
    }

    fn push(&mut self, user_id: DenseId, item_id: DenseId, timestamp: i64, label: f32) {
        self.pending.push_back(NormalizedInteraction {
            user_id,
            item_id,
            timestamp,
            label,
        });
    }
}

impl DropAccounting for InteractionIter<'_> {
    fn drop_report(&self) -> DropReport {
        self.report.clone()
    }
}

impl Iterator for InteractionIter<'_> {
    type Item = NormalizedInteraction;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(interaction) = self.pending.pop_front() {
                self.emitted += 1;
                return Some(interaction);
            }
            let rows = self.stream.rows;
            let row = rows.get(self.cursor)?;
            self.cursor += 1;
            self.expand(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairrec_model::{EntityKind, RawTimestamp, build_id_index};

    fn behavior(user: &str, article: Option<&str>, ts: Option<i64>) -> RawBehavior {
        RawBehavior {
            user: Some(user.to_string()),
            article: article.map(str::to_string),
            timestamp: ts.map(RawTimestamp::Epoch),
            ..RawBehavior::default()
        }
    }

    #[test]
    fn drops_row_missing_timestamp() {
        let rows = vec![
            behavior("u1", Some("a1"), Some(10)),
            behavior("u2", Some("a2"), None),
            behavior("u1", Some("a2"), Some(30)),
        ];
        let users = build_id_index(EntityKind::User, ["u1", "u2"]).unwrap();
        let items = build_id_index(EntityKind::Item, ["a1", "a2"]).unwrap();
        let stream = normalize_interactions(&rows, &users, &items, InteractionMode::Article);

        let mut iter = stream.iter();
        let out: Vec<NormalizedInteraction> = iter.by_ref().collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].item_id, 1);
        assert_eq!(out[1].timestamp, 30);
        assert_eq!(iter.report().missing_timestamp, 1);
        assert_eq!(iter.report().total(), 1);
    }

    #[test]
    fn stream_is_restartable() {
        let rows = vec![behavior("u1", Some("a1"), Some(10))];
        let users = build_id_index(EntityKind::User, ["u1"]).unwrap();
        let items = build_id_index(EntityKind::Item, ["a1"]).unwrap();
        let stream = normalize_interactions(&rows, &users, &items, InteractionMode::Article);

        let first: Vec<_> = stream.iter().collect();
        let second: Vec<_> = (&stream).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn impressions_label_clicks() {
        let rows = vec![RawBehavior {
            user: Some("u1".to_string()),
            timestamp: Some(RawTimestamp::Epoch(5)),
            inview: vec!["a1".to_string(), "a2".to_string(), "zz".to_string()],
            clicked: vec!["a2".to_string()],
            ..RawBehavior::default()
        }];
        let users = build_id_index(EntityKind::User, ["u1"]).unwrap();
        let items = build_id_index(EntityKind::Item, ["a1", "a2"]).unwrap();
        let stream = normalize_interactions(&rows, &users, &items, InteractionMode::Impressions);

        let mut iter = stream.iter();
        let labels: Vec<(u32, f32)> = iter.by_ref().map(|i| (i.item_id, i.label)).collect();
        assert_eq!(labels, vec![(0, 0.0), (1, 1.0)]);
        assert_eq!(iter.report().orphan_item, 1);
    }
}
