//! Search parameters: a fixed filter plus the one mutable piece, the cursor.

use serde::Serialize;

use crate::cursor::Cursor;

/// Default filter: English, no retweets, a handful of comedy hashtags.
pub const DEFAULT_QUERY: &str = "lang:en -is:retweet (#funny OR #comedy OR #jokeoftheday)";
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Query parameters for one recent-search request, serialized as the URL query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    query: String,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<Cursor>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY, DEFAULT_MAX_RESULTS)
    }
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results,
            next_token: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.next_token.as_ref()
    }

    /// Replace the cursor. `None` or an empty token removes the parameter
    /// entirely; an empty `next_token=` is not the same as omitting it.
    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.next_token = cursor.filter(|c| !c.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(q: &SearchQuery) -> serde_json::Value {
        serde_json::to_value(q).unwrap()
    }

    #[test]
    fn fresh_query_has_no_cursor_param() {
        let q = SearchQuery::default();
        let value = encoded(&q);
        assert!(value.get("next_token").is_none());
        assert_eq!(value["max_results"], 10);
        assert_eq!(value["query"], DEFAULT_QUERY);
    }

    #[test]
    fn cursor_is_set_and_overwritten() {
        let q = SearchQuery::default().with_cursor(Some(Cursor::from("first")));
        assert_eq!(q.cursor(), Some(&Cursor::from("first")));

        let q = q.with_cursor(Some(Cursor::from("second")));
        assert_eq!(encoded(&q)["next_token"], "second");
    }

    #[test]
    fn absent_cursor_removes_existing_param() {
        let q = SearchQuery::default()
            .with_cursor(Some(Cursor::from("first")))
            .with_cursor(None);
        assert!(q.cursor().is_none());
        assert!(encoded(&q).get("next_token").is_none());

        // Idempotent.
        let again = q.clone().with_cursor(None);
        assert_eq!(again, q);
    }

    #[test]
    fn empty_cursor_counts_as_absent() {
        let q = SearchQuery::default()
            .with_cursor(Some(Cursor::from("first")))
            .with_cursor(Some(Cursor::from("")));
        assert!(q.cursor().is_none());
    }

    #[test]
    fn filter_is_untouched_by_cursor_updates() {
        let q = SearchQuery::new("from:someone", 25).with_cursor(Some(Cursor::from("x")));
        assert_eq!(q.query(), "from:someone");
        assert_eq!(q.max_results(), 25);
    }
}
