use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use super::models::{RemoteCollection, RemoteIncrement};
use crate::storage::CollectionId;

/// Production endpoint of the highlight service
pub const DEFAULT_API_URL: &str = "https://plum.readavocado.com/api/";

/// Characters escaped when an identifier is used as a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Source of remote collections and their highlight increments
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List every collection visible to `token`
    async fn list_collections(&self, token: &str) -> Result<Vec<RemoteCollection>, RemoteError>;

    /// Fetch the highlights of one collection starting at `cursor`
    async fn fetch_increment(
        &self,
        token: &str,
        collection_id: &CollectionId,
        cursor: u64,
    ) -> Result<RemoteIncrement, RemoteError>;
}

/// HTTP client for the highlight service
pub struct AvocadoClient {
    client: Client,
    base_url: String,
}

impl AvocadoClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RemoteError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/obsidian/fetch/{}", self.base_url, path)
    }

    async fn get(&self, url: &str, token: &str) -> Result<Response, RemoteError> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        match response.status() {
            StatusCode::METHOD_NOT_ALLOWED => Err(RemoteError::InvalidToken),
            status if !status.is_success() => Err(RemoteError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl CatalogSource for AvocadoClient {
    async fn list_collections(&self, token: &str) -> Result<Vec<RemoteCollection>, RemoteError> {
        let response = self.get(&self.url("allbooks"), token).await?;
        Ok(response.json().await?)
    }

    async fn fetch_increment(
        &self,
        token: &str,
        collection_id: &CollectionId,
        cursor: u64,
    ) -> Result<RemoteIncrement, RemoteError> {
        let id = collection_id.to_string();
        let path = format!("{}/{}", utf8_percent_encode(&id, PATH_SEGMENT), cursor);
        let response = self.get(&self.url(&path), token).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{header, HeaderMap};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    const GOOD_TOKEN: &str = "good-token";

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", GOOD_TOKEN))
            .unwrap_or(false)
    }

    async fn all_books(headers: HeaderMap) -> axum::response::Response {
        if !authorized(&headers) {
            return axum::http::StatusCode::METHOD_NOT_ALLOWED.into_response();
        }
        Json(json!([[42, "My Book!!", "Author", ""], ["x/y", "Other", "B", "https://c"]]))
            .into_response()
    }

    async fn increment(
        Path((id, cursor)): Path<(String, u64)>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        if !authorized(&headers) {
            return axum::http::StatusCode::METHOD_NOT_ALLOWED.into_response();
        }
        if id == "broken" {
            return (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
        Json(json!([format!("{}@{}", id, cursor), cursor + 2])).into_response()
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/api/obsidian/fetch/allbooks", get(all_books))
            .route("/api/obsidian/fetch/{id}/{cursor}", get(increment));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            AvocadoClient::new("ftp://example.com"),
            Err(RemoteError::InvalidUrl(_))
        ));
        let client = AvocadoClient::new(DEFAULT_API_URL).unwrap();
        assert_eq!(client.base_url(), "https://plum.readavocado.com/api");
    }

    #[tokio::test]
    async fn test_list_collections() {
        let client = AvocadoClient::new(&spawn_server().await).unwrap();
        let books = client.list_collections(GOOD_TOKEN).await.unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].id, CollectionId::Number(42));
        assert_eq!(books[0].title, "My Book!!");
        assert!(books[1].has_cover());
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let client = AvocadoClient::new(&spawn_server().await).unwrap();
        let err = client.list_collections("wrong").await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidToken));
    }

    #[tokio::test]
    async fn test_fetch_increment() {
        let client = AvocadoClient::new(&spawn_server().await).unwrap();

        let inc = client
            .fetch_increment(GOOD_TOKEN, &CollectionId::Number(42), 3)
            .await
            .unwrap();
        assert_eq!(inc.content, "42@3");
        assert_eq!(inc.next_cursor, 5);

        // Slashes in identifiers stay inside one path segment
        let inc = client
            .fetch_increment(GOOD_TOKEN, &CollectionId::from("x/y"), 1)
            .await
            .unwrap();
        assert_eq!(inc.content, "x/y@1");
    }

    #[tokio::test]
    async fn test_server_error() {
        let client = AvocadoClient::new(&spawn_server().await).unwrap();
        let err = client
            .fetch_increment(GOOD_TOKEN, &CollectionId::from("broken"), 1)
            .await
            .unwrap_err();
        match err {
            RemoteError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AvocadoClient::new(&format!("http://{}/api/", addr)).unwrap();
        let err = client.list_collections(GOOD_TOKEN).await.unwrap_err();
        assert!(matches!(err, RemoteError::Http(_)));
    }
}
