//! Property tests for dense id assignment.

use std::collections::HashSet;

use proptest::prelude::*;

use fairrec_model::{EntityKind, SchemaError, build_id_index, build_id_index_checked};

proptest! {
    #[test]
    fn ids_are_dense_and_unique(tokens in proptest::collection::vec("[a-z0-9]{1,4}", 0..64)) {
        let index = build_id_index(EntityKind::User, &tokens).unwrap();
        let distinct: HashSet<&String> = tokens.iter().collect();
        prop_assert_eq!(index.len(), distinct.len());

        let ids: HashSet<u32> = tokens.iter().map(|t| index.get(t).unwrap()).collect();
        prop_assert_eq!(ids.len(), distinct.len());
        for id in 0..index.len() as u32 {
            prop_assert!(ids.contains(&id));
            let token = index.token(id).unwrap();
            prop_assert_eq!(index.get(token), Some(id));
        }
    }

    #[test]
    fn ids_follow_first_occurrence(tokens in proptest::collection::vec("[a-c]", 1..32)) {
        let index = build_id_index(EntityKind::Item, &tokens).unwrap();
        let mut expected = Vec::new();
        for token in &tokens {
            if !expected.contains(token) {
                expected.push(token.clone());
            }
        }
        let actual: Vec<String> = index.iter().map(|(token, _)| token.to_string()).collect();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn example_from_raw_log() {
    let index = build_id_index(EntityKind::User, ["u1", "u2", "u1"]).unwrap();
    let pairs: Vec<(&str, u32)> = index.iter().collect();
    assert_eq!(pairs, vec![("u1", 0), ("u2", 1)]);
}

#[test]
fn orphan_interaction_token_is_rejected() {
    let result = build_id_index_checked(
        EntityKind::Item,
        ["100", "200"],
        ["200", "300"],
        "behaviors",
    );
    assert!(matches!(
        result,
        Err(SchemaError::OrphanReference { ref token, .. }) if token == "300"
    ));
}
