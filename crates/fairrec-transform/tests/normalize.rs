//! Integration tests for dataset preparation and interaction normalization.

use std::collections::HashSet;

use proptest::prelude::*;

use fairrec_model::{InteractionMode, OrphanPolicy, RawArticle, RawBehavior, RawTimestamp};
use fairrec_transform::{NormalizeOptions, prepare_dataset};

fn behavior(user: &str, article: &str, ts: Option<&str>) -> RawBehavior {
    RawBehavior {
        user: Some(user.to_string()),
        article: Some(article.to_string()),
        timestamp: ts.map(|t| RawTimestamp::Text(t.to_string())),
        ..RawBehavior::default()
    }
}

fn articles(ids: &[&str]) -> Vec<RawArticle> {
    ids.iter()
        .map(|id| RawArticle {
            article: Some((*id).to_string()),
            category: Some("nyheder".to_string()),
            ..RawArticle::default()
        })
        .collect()
}

#[test]
fn one_missing_timestamp_is_dropped_and_counted() {
    let behaviors = vec![
        behavior("u1", "100", Some("2023-05-18 07:00:00")),
        behavior("u2", "200", None),
        behavior("u3", "100", Some("2023-05-18T08:00:00Z")),
        behavior("u1", "200", Some("2023-05-18 09:00:00")),
    ];
    let articles = articles(&["100", "200"]);
    let prepared =
        prepare_dataset(&behaviors, &articles, NormalizeOptions::default(), "behaviors").unwrap();

    let stream = prepared.interactions(&behaviors);
    let mut iter = stream.iter();
    let rows: Vec<_> = iter.by_ref().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(iter.report().missing_timestamp, 1);
    assert_eq!(iter.report().total(), 1);

    // u2 never interacts but still appears in the user table.
    assert_eq!(prepared.user_features.len(), 3);
}

#[test]
fn article_mode_drops_front_page_rows() {
    let mut front_page = behavior("u1", "x", Some("2023-05-18 07:00:00"));
    front_page.article = None;
    let behaviors = vec![front_page, behavior("u1", "100", Some("2023-05-18 07:01:00"))];
    let prepared = prepare_dataset(
        &behaviors,
        &articles(&["100"]),
        NormalizeOptions::default(),
        "behaviors",
    )
    .unwrap();
    let stream = prepared.interactions(&behaviors);
    let mut iter = stream.iter();
    assert_eq!(iter.by_ref().count(), 1);
    assert_eq!(iter.report().missing_item, 1);
}

fn arb_behaviors() -> impl Strategy<Value = Vec<(u8, u8, bool)>> {
    proptest::collection::vec((0u8..8, 0u8..6, any::<bool>()), 0..40)
}

proptest! {
    #[test]
    fn interaction_ids_resolve_in_feature_tables(rows in arb_behaviors(), impressions in any::<bool>()) {
        let behaviors: Vec<RawBehavior> = rows
            .iter()
            .map(|(user, item, has_ts)| RawBehavior {
                user: Some(format!("u{user}")),
                article: Some(format!("a{item}")),
                timestamp: has_ts.then_some(RawTimestamp::Epoch(1_683_000_000)),
                inview: vec![format!("a{item}"), format!("a{}", (item + 1) % 6)],
                clicked: vec![format!("a{item}")],
                ..RawBehavior::default()
            })
            .collect();
        let article_rows: Vec<RawArticle> = (0..6)
            .map(|i| RawArticle { article: Some(format!("a{i}")), ..RawArticle::default() })
            .collect();
        let options = NormalizeOptions {
            mode: if impressions { InteractionMode::Impressions } else { InteractionMode::Article },
            orphans: OrphanPolicy::Fail,
        };
        let prepared = prepare_dataset(&behaviors, &article_rows, options, "behaviors").unwrap();

        let user_ids: HashSet<u32> = prepared.user_features.iter().map(|u| u.user_id).collect();
        let item_ids: HashSet<u32> = prepared.item_features.iter().map(|i| i.item_id).collect();
        for interaction in &prepared.interactions(&behaviors) {
            prop_assert!(user_ids.contains(&interaction.user_id));
            prop_assert!(item_ids.contains(&interaction.item_id));
        }
    }
}
