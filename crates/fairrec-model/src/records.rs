//! Raw and normalized record types.

use serde::{Deserialize, Serialize};

use crate::ids::DenseId;

/// Timestamp as read from the source, before conversion to epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawTimestamp {
    /// Integer epoch of unknown unit; the magnitude decides the unit.
    Epoch(i64),
    /// Native datetime column value in the given unit since the epoch.
    Datetime { value: i64, unit: TimeUnit },
    /// Textual timestamp (RFC 3339 or naive ISO form).
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
}

/// One row of the EB-NeRD behavior log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBehavior {
    /// Raw user token; `None` when the cell was null.
    pub user: Option<String>,
    /// Article page on which the impression was logged; null on the front page.
    pub article: Option<String>,
    pub timestamp: Option<RawTimestamp>,
    pub inview: Vec<String>,
    pub clicked: Vec<String>,
    pub gender: Option<f64>,
    pub age: Option<f64>,
    pub is_subscriber: Option<bool>,
}

/// One row of the EB-NeRD article metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub article: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub premium: Option<bool>,
}

/// A user-item event with dense ids and an epoch-seconds timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInteraction {
    pub user_id: DenseId,
    pub item_id: DenseId,
    pub timestamp: i64,
    pub label: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFeature {
    pub item_id: DenseId,
    pub title: Option<String>,
    /// Category name, the default sensitive item attribute.
    pub category: Option<String>,
    pub premium: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFeature {
    pub user_id: DenseId,
    pub gender: Option<f64>,
    pub age: Option<f64>,
    pub subscriber: Option<bool>,
}

impl UserFeature {
    pub fn new(user_id: DenseId) -> Self {
        Self {
            user_id,
            gender: None,
            age: None,
            subscriber: None,
        }
    }

    /// Fills demographic fields that are still empty from a later behavior row.
    pub fn absorb(&mut self, behavior: &RawBehavior) {
        if self.gender.is_none() {
            self.gender = behavior.gender;
        }
        if self.age.is_none() {
            self.age = behavior.age;
        }
        if self.subscriber.is_none() {
            self.subscriber = behavior.is_subscriber;
        }
    }
}
