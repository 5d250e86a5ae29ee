//! Reshape search responses into stored records and the next cursor.

use recent_search_client::{RawTweet, SearchResponse};

use crate::cursor::Cursor;

/// The stored shape of a tweet: `(id, text)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetRecord {
    pub id: String,
    pub text: String,
}

impl TweetRecord {
    /// A raw tweet is usable only when both `id` and `text` are present.
    pub fn from_raw(raw: RawTweet) -> Option<Self> {
        Some(Self {
            id: raw.id?,
            text: raw.text?,
        })
    }
}

/// Records kept from one page, plus how many were dropped as invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub records: Vec<TweetRecord>,
    pub dropped: usize,
}

impl Extracted {
    /// True when the page carried no tweets at all, valid or not.
    pub fn is_empty_page(&self) -> bool {
        self.records.is_empty() && self.dropped == 0
    }
}

/// Valid records of a page in response order. A missing or empty `data`
/// section gives no records.
pub fn extract_records(response: &SearchResponse) -> Extracted {
    let Some(data) = response.data.as_ref() else {
        return Extracted::default();
    };

    let records: Vec<TweetRecord> = data
        .iter()
        .cloned()
        .filter_map(TweetRecord::from_raw)
        .collect();
    let dropped = data.len() - records.len();
    if dropped > 0 {
        tracing::debug!(dropped, "Dropped tweets missing id or text");
    }

    Extracted { records, dropped }
}

/// `meta.next_token` exactly as received, or `None` when any level is missing.
pub fn extract_next_cursor(response: &SearchResponse) -> Option<Cursor> {
    response
        .meta
        .as_ref()?
        .next_token
        .as_deref()
        .map(Cursor::from)
}
