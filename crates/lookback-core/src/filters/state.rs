//! Owner of the canonical query string.
//!
//! The string is the single source of truth; structured filters and the
//! active-filter list are recomputed from it on every read, so there is no
//! second mutable copy to fall out of sync. Edit operations reassemble the
//! string from the same token scan the parser uses.

use super::parser::{parse_query, quote_value, scan};
use super::{ActiveFilter, FilterKey, SearchFilters, DEFAULT_LIMIT, DEFAULT_PAGE};

#[derive(Debug, Clone)]
pub struct FilterState {
    raw: String,
    page: u32,
    limit: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        FilterState {
            raw: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn raw_query(&self) -> &str {
        &self.raw
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Replace the canonical string verbatim (user keystrokes). Does not
    /// reset pagination.
    pub fn set_query(&mut self, text: &str) {
        self.raw = text.to_string();
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
    }

    /// Structured view of the current canonical string plus cached
    /// pagination.
    pub fn filters(&self) -> SearchFilters {
        let mut filters = parse_query(&self.raw);
        filters.page = self.page;
        filters.limit = self.limit;
        filters
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.filters().active_filters()
    }

    /// Set `key` to `value`, replacing any existing tokens for that key.
    /// Resets to the first page.
    pub fn add_filter(&mut self, key: FilterKey, value: &str) {
        let mut parts: Vec<&str> = scan(&self.raw)
            .into_iter()
            .filter(|token| token.key != Some(key))
            .map(|token| token.raw)
            .collect();
        let appended = format!("{}:{}", key.as_str(), quote_value(value));
        parts.push(&appended);
        let rebuilt = parts.join(" ");
        self.raw = rebuilt;
        self.page = DEFAULT_PAGE;
    }

    /// Remove the tokens matching the given active filter's key and exact
    /// value. Comparison happens on parsed values, so values containing
    /// grammar metacharacters need no escaping. Resets to the first page.
    pub fn remove_filter(&mut self, filter: &ActiveFilter) {
        let kept: Vec<&str> = scan(&self.raw)
            .into_iter()
            .filter(|token| !(token.key == Some(filter.key) && token.value == filter.value))
            .map(|token| token.raw)
            .collect();
        let rebuilt = kept.join(" ");
        self.raw = rebuilt;
        self.page = DEFAULT_PAGE;
    }

    /// Clear the canonical string entirely. Resets to the first page.
    pub fn remove_all_filters(&mut self) {
        self.raw.clear();
        self.page = DEFAULT_PAGE;
    }
}
