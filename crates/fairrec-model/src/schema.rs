//! Atomic-file field schema for the emitted tables.
//!
//! Every table starts with a header line of `name:type` fields. The field
//! names below are the ones the fairness-aware models look up through
//! `load_col` and `sst_attr_list`.

use serde::{Deserialize, Serialize};

use crate::records::{ItemFeature, NormalizedInteraction, UserFeature};

/// Column types understood by the framework loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Token,
    TokenSeq,
    Float,
    FloatSeq,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::TokenSeq => "token_seq",
            Self::Float => "float",
            Self::FloatSeq => "float_seq",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }

    /// Header cell, e.g. `user_id:token`.
    pub fn header(&self) -> String {
        format!("{}:{}", self.name, self.field_type.as_str())
    }
}

pub const USER_ID_FIELD: &str = "user_id";
pub const ITEM_ID_FIELD: &str = "item_id";
pub const TIME_FIELD: &str = "timestamp";
pub const LABEL_FIELD: &str = "label";

const INTER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(USER_ID_FIELD, FieldType::Token),
    FieldSpec::new(ITEM_ID_FIELD, FieldType::Token),
    FieldSpec::new(TIME_FIELD, FieldType::Float),
    FieldSpec::new(LABEL_FIELD, FieldType::Float),
];

const ITEM_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(ITEM_ID_FIELD, FieldType::Token),
    FieldSpec::new("news_title", FieldType::TokenSeq),
    FieldSpec::new("genre", FieldType::Token),
    FieldSpec::new("premium", FieldType::Float),
];

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(USER_ID_FIELD, FieldType::Token),
    FieldSpec::new("gender", FieldType::Float),
    FieldSpec::new("age", FieldType::Float),
    FieldSpec::new("subscriber", FieldType::Float),
];

/// The three atomic files produced by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Inter,
    Item,
    User,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [Self::Inter, Self::Item, Self::User];

    /// File extension used by the framework loader.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Inter => "inter",
            Self::Item => "item",
            Self::User => "user",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Inter => INTER_FIELDS,
            Self::Item => ITEM_FIELDS,
            Self::User => USER_FIELDS,
        }
    }

    pub fn field_names(self) -> impl Iterator<Item = &'static str> {
        self.fields().iter().map(|field| field.name)
    }

    pub fn has_field(self, name: &str) -> bool {
        self.fields().iter().any(|field| field.name == name)
    }

    /// `<dataset>.<extension>`
    pub fn file_name(self, dataset: &str) -> String {
        format!("{dataset}.{}", self.extension())
    }

    pub fn header(self, separator: char) -> String {
        let cells: Vec<String> = self.fields().iter().map(FieldSpec::header).collect();
        cells.join(&separator.to_string())
    }
}

/// Rendering of a record into atomic-file cells, in [`TableKind::fields`] order.
pub trait AtomicRow {
    const TABLE: TableKind;

    fn cells(&self) -> Vec<String>;
}

impl AtomicRow for NormalizedInteraction {
    const TABLE: TableKind = TableKind::Inter;

    fn cells(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.item_id.to_string(),
            self.timestamp.to_string(),
            format_numeric(f64::from(self.label)),
        ]
    }
}

impl AtomicRow for ItemFeature {
    const TABLE: TableKind = TableKind::Item;

    fn cells(&self) -> Vec<String> {
        vec![
            self.item_id.to_string(),
            self.title.as_deref().map(sanitize_token_seq).unwrap_or_default(),
            self.category.as_deref().map(sanitize_token).unwrap_or_default(),
            format_flag(self.premium),
        ]
    }
}

impl AtomicRow for UserFeature {
    const TABLE: TableKind = TableKind::User;

    fn cells(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.gender.map(format_numeric).unwrap_or_default(),
            self.age.map(format_numeric).unwrap_or_default(),
            format_flag(self.subscriber),
        ]
    }
}

/// Formats a float without trailing zeros (`1.0` -> `1`, `0.50` -> `0.5`).
pub fn format_numeric(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn format_flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => String::new(),
    }
}

/// Collapses whitespace (including separators and line breaks) to single spaces.
pub fn sanitize_token_seq(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single token: whitespace runs become underscores so the value stays one token.
pub fn sanitize_token(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inter_header() {
        insta::assert_snapshot!(
            TableKind::Inter.header('\t').replace('\t', " | "),
            @"user_id:token | item_id:token | timestamp:float | label:float"
        );
    }

    #[test]
    fn user_header_uses_user_id() {
        insta::assert_snapshot!(
            TableKind::User.header(','),
            @"user_id:token,gender:float,age:float,subscriber:float"
        );
    }

    #[test]
    fn numeric_formatting() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(0.5), "0.5");
        assert_eq!(format_numeric(35.0), "35");
        assert_eq!(format_numeric(100.0), "100");
    }

    #[test]
    fn item_cells_strip_separators() {
        let item = ItemFeature {
            item_id: 3,
            title: Some("Breaking:\tnews\nto day ".to_string()),
            category: Some("sport fodbold".to_string()),
            premium: Some(false),
        };
        assert_eq!(
            item.cells(),
            vec!["3", "Breaking: news to day", "sport_fodbold", "0"]
        );
    }
}
