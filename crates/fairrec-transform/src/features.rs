//! Item and user feature tables and the id indexes they define.

use fairrec_model::{
    DropReason, DropReport, EntityKind, IdIndex, ItemFeature, RawArticle, RawBehavior, Result,
    UserFeature, build_id_index,
};

/// A feature table together with the index that assigned its ids.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable<T> {
    pub index: IdIndex,
    pub rows: Vec<T>,
    pub dropped: DropReport,
}

/// Item features in article-file order; the first row wins for duplicate ids.
pub fn build_item_features(articles: &[RawArticle]) -> Result<FeatureTable<ItemFeature>> {
    let mut dropped = DropReport::default();
    let tokens: Vec<&str> = articles
        .iter()
        .filter_map(|article| {
            if article.article.is_none() {
                dropped.record(DropReason::MissingArticleId);
            }
            article.article.as_deref()
        })
        .collect();
    let index = build_id_index(EntityKind::Item, &tokens)?;

    let mut rows: Vec<Option<ItemFeature>> = vec![None; index.len()];
    for article in articles {
        let Some(token) = article.article.as_deref() else {
            continue;
        };
        let Some(item_id) = index.get(token) else {
            continue;
        };
        let slot = &mut rows[item_id as usize];
        if slot.is_none() {
            *slot = Some(ItemFeature {
                item_id,
                title: article.title.clone(),
                category: article.category.clone(),
                premium: article.premium,
            });
        }
    }

    let duplicates = tokens.len() - index.len();
    if duplicates > 0 {
        tracing::warn!(duplicates, "duplicate article ids, keeping first occurrence");
    }
    Ok(FeatureTable {
        index,
        rows: rows.into_iter().flatten().collect(),
        dropped,
    })
}

/// User features in first-seen order over the behavior log.
///
/// Demographics are taken from the first row that carries a value for each
/// field. Users are kept even when every demographic field is empty.
pub fn build_user_features(behaviors: &[RawBehavior]) -> Result<FeatureTable<UserFeature>> {
    let tokens = behaviors.iter().filter_map(|row| row.user.as_deref());
    let index = build_id_index(EntityKind::User, tokens)?;

    let mut rows: Vec<UserFeature> = (0..index.len() as u32).map(UserFeature::new).collect();
    for behavior in behaviors {
        let Some(user_id) = behavior.user.as_deref().and_then(|token| index.get(token)) else {
            continue;
        };
        rows[user_id as usize].absorb(behavior);
    }

    Ok(FeatureTable {
        index,
        rows,
        dropped: DropReport::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: Option<&str>, category: &str) -> RawArticle {
        RawArticle {
            article: id.map(str::to_string),
            title: Some(format!("title {category}")),
            category: Some(category.to_string()),
            premium: None,
        }
    }

    #[test]
    fn items_keep_first_duplicate_and_count_missing_ids() {
        let articles = vec![
            article(Some("100"), "nyheder"),
            article(None, "sport"),
            article(Some("200"), "sport"),
            article(Some("100"), "krimi"),
        ];
        let table = build_item_features(&articles).unwrap();
        assert_eq!(table.index.len(), 2);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].category.as_deref(), Some("nyheder"));
        assert_eq!(table.rows[1].item_id, 1);
        assert_eq!(table.dropped.missing_article_id, 1);
    }

    #[test]
    fn users_collect_first_demographics() {
        let behaviors = vec![
            RawBehavior {
                user: Some("u1".to_string()),
                ..RawBehavior::default()
            },
            RawBehavior {
                user: Some("u2".to_string()),
                age: Some(40.0),
                ..RawBehavior::default()
            },
            RawBehavior {
                user: Some("u1".to_string()),
                gender: Some(1.0),
                age: Some(25.0),
                ..RawBehavior::default()
            },
            RawBehavior {
                user: Some("u1".to_string()),
                age: Some(99.0),
                ..RawBehavior::default()
            },
            RawBehavior::default(),
        ];
        let table = build_user_features(&behaviors).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].gender, Some(1.0));
        assert_eq!(table.rows[0].age, Some(25.0));
        assert_eq!(table.rows[1].age, Some(40.0));
        assert_eq!(table.rows[1].gender, None);
    }
}
