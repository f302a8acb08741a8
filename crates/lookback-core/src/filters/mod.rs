//! The search filter grammar: a canonical query string mixing free text with
//! `date:` / `time:` / `title:` / `url:` tokens, its typed representation,
//! and the state manager that edits the string without re-deriving the
//! grammar anywhere else.

pub mod parser;
pub mod state;

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 12;

/// The recognized filter prefixes. Anything else in the query string is free
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKey {
    Date,
    Time,
    Title,
    Url,
}

impl FilterKey {
    /// Fixed ordering used by both the canonical renderer and the
    /// active-filter projection, so identical filters always serialize and
    /// display identically.
    pub const ALL: [FilterKey; 4] = [
        FilterKey::Date,
        FilterKey::Time,
        FilterKey::Title,
        FilterKey::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Date => "date",
            FilterKey::Time => "time",
            FilterKey::Title => "title",
            FilterKey::Url => "url",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterKey::Date => "Date",
            FilterKey::Time => "Time",
            FilterKey::Title => "Title",
            FilterKey::Url => "URL",
        }
    }

    pub(crate) fn from_prefix(prefix: &str) -> Option<FilterKey> {
        match prefix.to_ascii_lowercase().as_str() {
            "date" => Some(FilterKey::Date),
            "time" => Some(FilterKey::Time),
            "title" => Some(FilterKey::Title),
            "url" => Some(FilterKey::Url),
            _ => None,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed representation of a canonical query string plus pagination.
///
/// `date` and `time` hold the raw user-entered values; validation and
/// normalization happen downstream in the retrieval planner, which treats
/// unparseable values as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            query: String::new(),
            date: None,
            time: None,
            title: None,
            url: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchFilters {
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Date => self.date.as_deref(),
            FilterKey::Time => self.time.as_deref(),
            FilterKey::Title => self.title.as_deref(),
            FilterKey::Url => self.url.as_deref(),
        }
    }

    pub(crate) fn set(&mut self, key: FilterKey, value: String) {
        let slot = match key {
            FilterKey::Date => &mut self.date,
            FilterKey::Time => &mut self.time,
            FilterKey::Title => &mut self.title,
            FilterKey::Url => &mut self.url,
        };
        *slot = Some(value);
    }

    /// True when neither free text nor any filter is set.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && FilterKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Display projection: one entry per set filter field, in `ALL` order.
    /// Pure: two equal filter sets always project to the same list.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        FilterKey::ALL
            .iter()
            .filter_map(|key| {
                self.get(*key).map(|value| ActiveFilter {
                    key: *key,
                    value: value.to_string(),
                    label: format!("{}: {}", key.label(), value),
                })
            })
            .collect()
    }
}

/// A single filter rendered for display, e.g. as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilter {
    pub key: FilterKey,
    pub value: String,
    pub label: String,
}
