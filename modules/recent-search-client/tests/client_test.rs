//! SearchClient against a one-shot local HTTP responder. No external network.

use recent_search_client::{SearchClient, SearchError};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Serialize)]
struct Params<'a> {
    query: &'a str,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

/// Serve exactly one request with the given status line and body, returning
/// the raw request head that was received.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}/2/tweets/search/recent"), handle)
}

#[tokio::test]
async fn success_parses_body_and_sends_auth_headers() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"data":[{"id":"1","text":"hello, world"}],"meta":{"next_token":"abc"}}"#,
    )
    .await;
    let client = SearchClient::with_endpoint(&url, "secret-token".to_string());

    let resp = client
        .search(&Params {
            query: "lang:en",
            max_results: 10,
            next_token: None,
        })
        .await
        .unwrap();

    let data = resp.data.unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].id.as_deref(), Some("1"));
    assert_eq!(resp.meta.unwrap().next_token.as_deref(), Some("abc"));

    let request = server.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(lower.contains("authorization: bearer secret-token"));
    assert!(lower.contains("user-agent: v2recentsearchrust"));
    assert!(request.contains("max_results=10"));
    assert!(
        !request.contains("next_token"),
        "absent cursor must not be sent at all: {request}"
    );
}

#[tokio::test]
async fn cursor_is_sent_as_next_token_param() {
    let (url, server) = serve_once("200 OK", "{}").await;
    let client = SearchClient::with_endpoint(&url, "t".to_string());

    let resp = client
        .search(&Params {
            query: "q",
            max_results: 10,
            next_token: Some("tok123"),
        })
        .await
        .unwrap();
    assert!(resp.data.is_none());

    let request = server.await.unwrap();
    assert!(request.contains("next_token=tok123"));
}

#[tokio::test]
async fn non_success_status_is_api_error_with_body() {
    let (url, server) = serve_once("429 Too Many Requests", r#"{"title":"Too Many Requests"}"#).await;
    let client = SearchClient::with_endpoint(&url, "t".to_string());

    let err = client
        .search(&Params {
            query: "q",
            max_results: 10,
            next_token: None,
        })
        .await
        .unwrap_err();

    match &err {
        SearchError::Api { status, message } => {
            assert_eq!(*status, 429);
            assert!(message.contains("Too Many Requests"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.status(), Some(429));
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let (url, server) = serve_once("200 OK", "not json").await;
    let client = SearchClient::with_endpoint(&url, "t".to_string());

    let err = client
        .search(&Params {
            query: "q",
            max_results: 10,
            next_token: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Parse(_)));
    server.await.unwrap();
}
