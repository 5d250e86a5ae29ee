pub mod error;
pub mod types;

pub use error::{Result, SearchError};
pub use types::{RawTweet, SearchMeta, SearchResponse};

use serde::Serialize;

/// Recent search, covering the last seven days of public tweets.
pub const RECENT_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

/// Fixed identifying header sent with every request.
const USER_AGENT: &str = "v2RecentSearchRust";

pub struct SearchClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl SearchClient {
    pub fn with_endpoint(endpoint: &str, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            token,
        }
    }

    /// Run one search request. `params` is encoded as the query string, so
    /// optional fields that serialize to nothing are left out of the URL.
    pub async fn search<P>(&self, params: &P) -> Result<SearchResponse>
    where
        P: Serialize + ?Sized,
    {
        let resp = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            records = parsed.data.as_ref().map_or(0, Vec::len),
            has_next = parsed
                .meta
                .as_ref()
                .and_then(|m| m.next_token.as_ref())
                .is_some(),
            "Search page received"
        );
        Ok(parsed)
    }
}
