use async_trait::async_trait;
use recent_search_client::{SearchClient, SearchResponse};

use crate::query::SearchQuery;

/// One request/response exchange against the search endpoint.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> recent_search_client::Result<SearchResponse>;
}

#[async_trait]
impl SearchBackend for SearchClient {
    async fn search(&self, query: &SearchQuery) -> recent_search_client::Result<SearchResponse> {
        SearchClient::search(self, query).await
    }
}
