use serde::Deserialize;

/// Body of a recent-search response.
///
/// Both sections are optional: a page with no matches has no `data`, and the
/// last page of a walk has no `meta.next_token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<RawTweet>>,
    #[serde(default)]
    pub meta: Option<SearchMeta>,
}

/// A tweet as returned by the endpoint. Nothing is guaranteed present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTweet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub newest_id: Option<String>,
    #[serde(default)]
    pub oldest_id: Option<String>,
}
