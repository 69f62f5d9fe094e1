//! Source column names, defaulting to the EB-NeRD release layout.

use serde::{Deserialize, Serialize};

/// Column names of the behavior log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorColumns {
    pub user: String,
    pub article: String,
    pub timestamp: String,
    pub inview: String,
    pub clicked: String,
    pub gender: String,
    pub age: String,
    pub is_subscriber: String,
}

impl Default for BehaviorColumns {
    fn default() -> Self {
        Self {
            user: "user_id".to_string(),
            article: "article_id".to_string(),
            timestamp: "impression_time".to_string(),
            inview: "article_ids_inview".to_string(),
            clicked: "article_ids_clicked".to_string(),
            gender: "gender".to_string(),
            age: "age".to_string(),
            is_subscriber: "is_subscriber".to_string(),
        }
    }
}

/// Column names of the article metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleColumns {
    pub article: String,
    pub title: String,
    pub category: String,
    pub premium: String,
}

impl Default for ArticleColumns {
    fn default() -> Self {
        Self {
            article: "article_id".to_string(),
            title: "title".to_string(),
            category: "category_str".to_string(),
            premium: "premium".to_string(),
        }
    }
}
