//! Tokenizer and parser for the canonical query string.
//!
//! `scan` is the single definition of the filter-token grammar. The parser
//! consumes its tokens to build a [`SearchFilters`], and the state manager
//! reassembles the canonical string from surviving tokens when editing, so
//! both sides recognize exactly the same language.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{FilterKey, SearchFilters};

static FILTER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(date|time|title|url):").unwrap());

/// One token of the canonical string. `raw` is the exact source slice,
/// including any quotes, so edits can rebuild the string from kept tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub raw: &'a str,
    pub key: Option<FilterKey>,
    pub value: String,
}

impl<'a> Token<'a> {
    fn free(raw: &'a str) -> Token<'a> {
        Token {
            raw,
            key: None,
            value: raw.to_string(),
        }
    }
}

/// Split a raw query string into free-text and filter tokens.
///
/// Tokens are whitespace-separated. A token whose head matches
/// `(date|time|title|url):` (prefix case-insensitive) is a filter token; a
/// quoted value extends the token to the matching closing quote, spanning
/// whitespace. A prefix with an empty value, or with an unmatched opening
/// quote and nothing else, degrades gracefully rather than erroring.
pub(crate) fn scan(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < raw.len() {
        let rest = &raw[pos..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        pos += rest.len() - trimmed.len();

        let word_len = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let word = &trimmed[..word_len];
        let mut consumed = word.len();
        let mut token = Token::free(word);

        if let Some(head) = FILTER_PREFIX.find(word) {
            if let Some(key) = FilterKey::from_prefix(&word[..head.end() - 1]) {
                let value = &word[head.end()..];
                match value.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        // Quoted value: spans to the matching closing quote,
                        // which may lie beyond the current word.
                        let open = head.end() + 1;
                        if let Some(close) = trimmed[open..].find(quote) {
                            let end = open + close + 1;
                            let raw = &trimmed[..end];
                            token = if close == 0 {
                                // `title:""` is as empty as `title:`, so free text
                                Token::free(raw)
                            } else {
                                Token {
                                    raw,
                                    key: Some(key),
                                    value: trimmed[open..open + close].to_string(),
                                }
                            };
                            consumed = end;
                        } else {
                            // Unterminated quote: fall back to the bare word,
                            // quote character kept in the value.
                            token = Token {
                                raw: word,
                                key: Some(key),
                                value: value.to_string(),
                            };
                        }
                    }
                    Some(_) => {
                        token = Token {
                            raw: word,
                            key: Some(key),
                            value: value.to_string(),
                        };
                    }
                    // Bare `date:` with no value is free text, not a filter.
                    None => {}
                }
            }
        }

        pos += consumed;
        tokens.push(token);
    }

    tokens
}

/// Parse a raw query string into structured filters.
///
/// Never fails: malformed filter values pass through as opaque strings for
/// the retrieval planner to validate. When a prefix appears more than once,
/// the first occurrence wins and the rest are dropped from the residual
/// free text.
pub fn parse_query(raw: &str) -> SearchFilters {
    let mut filters = SearchFilters::default();
    let mut free: Vec<&str> = Vec::new();

    for token in scan(raw) {
        match token.key {
            Some(key) => {
                if filters.get(key).is_none() {
                    filters.set(key, token.value);
                }
            }
            None => free.push(token.raw),
        }
    }

    filters.query = free.join(" ");
    filters
}

/// Serialize structured filters back into a canonical query string.
///
/// Inverse of [`parse_query`] for any value the grammar can produce:
/// free text first, then filters in [`FilterKey::ALL`] order, values quoted
/// when they contain whitespace (single quotes when the value itself holds a
/// double quote). `page`/`limit` are not part of the string.
pub fn render_query(filters: &SearchFilters) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !filters.query.is_empty() {
        parts.push(filters.query.clone());
    }
    for key in FilterKey::ALL {
        if let Some(value) = filters.get(key) {
            parts.push(format!("{}:{}", key.as_str(), quote_value(value)));
        }
    }
    parts.join(" ")
}

/// Quote a value that contains whitespace, choosing the quote character not
/// present in the value so the result re-parses to the same value. A value
/// containing whitespace plus both quote characters has no representation in
/// the grammar.
pub(crate) fn quote_value(value: &str) -> Cow<'_, str> {
    if !value.chars().any(char::is_whitespace) {
        return Cow::Borrowed(value);
    }
    if value.contains('"') {
        Cow::Owned(format!("'{}'", value))
    } else {
        Cow::Owned(format!("\"{}\"", value))
    }
}
