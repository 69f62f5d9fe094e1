//! Metric extraction from framework log lines.
//!
//! The framework reports results in a few shapes:
//!
//! ```text
//! best valid : OrderedDict([('recall@10', 0.0712), ('ndcg@10', 0.0391)])
//! test result: {'recall@10': 0.0688, 'ndcg@10': 0.0377}
//! valid result:
//! recall@10 : 0.0712    ndcg@10 : 0.0391
//! ```
//!
//! A marker line without values takes its values from the next non-empty,
//! unmarked line.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Which result a metric line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSection {
    BestValid,
    Valid,
    Test,
}

impl MetricSection {
    pub const ALL: [MetricSection; 3] = [Self::BestValid, Self::Valid, Self::Test];

    /// Marker text as it appears in the log.
    pub fn marker(self) -> &'static str {
        match self {
            Self::BestValid => "best valid",
            Self::Valid => "valid result",
            Self::Test => "test result",
        }
    }

    /// Finds the section marker in `line` and returns the text after it.
    fn locate(line: &str) -> Option<(Self, &str)> {
        let lower = line.to_ascii_lowercase();
        Self::ALL.into_iter().find_map(|section| {
            lower
                .find(section.marker())
                .map(|start| (section, &line[start + section.marker().len()..]))
        })
    }
}

impl fmt::Display for MetricSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

pub type MetricMap = BTreeMap<String, f64>;

/// Latest metrics seen per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricReport {
    sections: BTreeMap<MetricSection, MetricMap>,
}

impl MetricReport {
    pub fn get(&self, section: MetricSection) -> Option<&MetricMap> {
        self.sections.get(&section)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricSection, &MetricMap)> {
        self.sections.iter().map(|(section, map)| (*section, map))
    }

    /// Metric names across all sections, sorted.
    pub fn metric_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sections
            .values()
            .flat_map(|map| map.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn set(&mut self, section: MetricSection, values: MetricMap) {
        self.sections.insert(section, values);
    }
}

/// Line-by-line accumulator for [`MetricReport`].
#[derive(Debug, Default)]
pub struct MetricParser {
    pending: Option<MetricSection>,
    report: MetricReport,
}

impl MetricParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one output line. Returns the section updated by it, if any.
    pub fn feed(&mut self, raw_line: &str) -> Option<MetricSection> {
        let line = strip_ansi(raw_line);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some((section, rest)) = MetricSection::locate(line) {
            let values = parse_metric_pairs(rest);
            if values.is_empty() {
                self.pending = Some(section);
                return None;
            }
            if self.pending == Some(section) {
                self.pending = None;
            }
            self.report.set(section, values);
            return Some(section);
        }

        let section = self.pending.take()?;
        let values = parse_metric_pairs(line);
        if values.is_empty() {
            return None;
        }
        self.report.set(section, values);
        Some(section)
    }

    pub fn report(&self) -> &MetricReport {
        &self.report
    }

    pub fn finish(self) -> MetricReport {
        self.report
    }
}

/// Parses every `name <sep> value` pair in `text`.
///
/// Quotes, brackets, `:`, `,` and `=` are treated as separators; a pair is
/// a token containing a letter followed by a token that parses as a number.
pub fn parse_metric_pairs(text: &str) -> MetricMap {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '\'' | '"' | '(' | ')' | '[' | ']' | '{' | '}' | ':' | ',' | '=' => ' ',
            other => other,
        })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let mut values = MetricMap::new();
    let mut index = 0;
    while index + 1 < tokens.len() {
        let name = tokens[index];
        let is_name = name.chars().any(char::is_alphabetic) && parse_number(name).is_none();
        match (is_name, parse_number(tokens[index + 1])) {
            (true, Some(value)) => {
                values.insert(name.to_string(), value);
                index += 2;
            }
            _ => index += 1,
        }
    }
    values
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Removes ANSI colour escape sequences (`ESC [ ... letter`).
fn strip_ansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}
