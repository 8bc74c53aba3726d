//! HTTP Book Catalog - 调用后端 REST 服务
//!
//! 实现 BookCatalogPort trait
//!
//! 后端 API:
//! - GET  {base_url}/books
//! - GET  {base_url}/books/{id}
//! - GET  {base_url}/books/{id}/audio-segments
//! - POST {base_url}/upload  {"fileUrl": "...", "title": "..."}
//!
//! 清单中的相对 `audioUrl`（如 `/audio/tts-xxx.mp3`）按 base_url 解析为绝对地址

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::application::ports::{BookCatalogPort, CatalogError, CreateBookRequest, UploadReceipt};
use crate::domain::book::{AudioSegment, Book, BookId};

/// HTTP 目录客户端配置
#[derive(Debug, Clone)]
pub struct HttpBookCatalogConfig {
    /// 后端 API 基础 URL（包含 `/api` 前缀）
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpBookCatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpBookCatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 目录客户端
pub struct HttpBookCatalog {
    client: Client,
    base_url: String,
    /// 用于解析相对音频地址
    origin: Url,
}

impl HttpBookCatalog {
    pub fn new(config: HttpBookCatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url)
            .map_err(|e| CatalogError::NetworkError(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            origin,
        })
    }

    /// 相对地址按 base_url 解析；空地址（未合成）与绝对地址原样保留
    fn resolve_audio_url(&self, audio_url: &str) -> String {
        if audio_url.is_empty() {
            return String::new();
        }
        match self.origin.join(audio_url) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(audio_url = %audio_url, error = %e, "Cannot resolve audio URL");
                audio_url.to_string()
            }
        }
    }

    fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    fn book_url(&self, id: &BookId) -> String {
        format!("{}/books/{}", self.base_url, id)
    }

    fn segments_url(&self, id: &BookId) -> String {
        format!("{}/books/{}/audio-segments", self.base_url, id)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        tracing::debug!(url = %url, "Sending catalog request");
        let response = self.client.get(url).send().await.map_err(map_send_error)?;
        decode(response).await
    }
}

fn map_send_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout
    } else if e.is_connect() {
        CatalogError::NetworkError(format!("Cannot connect to backend: {}", e))
    } else {
        CatalogError::NetworkError(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::ServiceError {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl BookCatalogPort for HttpBookCatalog {
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        let books: Vec<Book> = self.get_json(&self.books_url()).await?;
        tracing::debug!(count = books.len(), "Catalog listed books");
        Ok(books)
    }

    async fn get_book(&self, id: &BookId) -> Result<Book, CatalogError> {
        match self.get_json::<Book>(&self.book_url(id)).await {
            Err(CatalogError::ServiceError { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(CatalogError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    async fn create_book(&self, request: CreateBookRequest) -> Result<UploadReceipt, CatalogError> {
        tracing::debug!(url = %self.upload_url(), title = %request.title, "Creating book record");

        let response = self
            .client
            .post(self.upload_url())
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        decode(response).await
    }

    async fn fetch_segments(&self, id: &BookId) -> Result<Vec<AudioSegment>, CatalogError> {
        let mut segments: Vec<AudioSegment> = self.get_json(&self.segments_url(id)).await?;
        for segment in &mut segments {
            segment.audio_url = self.resolve_audio_url(&segment.audio_url);
        }
        tracing::debug!(book_id = %id, count = segments.len(), "Fetched segment manifest");
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookStatus, SegmentStatus};
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route(
                "/api/books",
                get(|| async {
                    Json(json!([
                        {"id": "b1", "title": "Dune", "author": "Herbert", "coverUrl": "", "fileUrl": "https://f/b1.pdf", "status": "ready"},
                        {"id": "b2", "title": "Emma", "status": "processing"}
                    ]))
                }),
            )
            .route(
                "/api/books/:id",
                get(|Path(id): Path<String>| async move {
                    if id == "b1" {
                        Ok(Json(json!({"id": "b1", "title": "Dune", "status": "ready"})))
                    } else {
                        Err(AxumStatus::NOT_FOUND)
                    }
                }),
            )
            .route(
                "/api/books/:id/audio-segments",
                get(|Path(id): Path<String>| async move {
                    if id == "broken" {
                        return Err((AxumStatus::INTERNAL_SERVER_ERROR, "db down"));
                    }
                    if id == "relative" {
                        return Ok(Json(json!([
                            {"id": "s0", "bookId": id, "audioUrl": "/audio/tts-abc.mp3", "status": "completed"},
                            {"id": "s1", "bookId": id, "audioUrl": "", "status": "skipped"}
                        ])));
                    }
                    Ok(Json(json!([
                        {"id": "s0", "bookId": id, "content": "One.", "audioUrl": "https://a/0.mp3", "status": "completed"},
                        {"id": "s1", "bookId": id, "content": "Two.", "audioUrl": "", "status": "pending"}
                    ])))
                }),
            )
            .route(
                "/api/upload",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["title"], "Dune");
                    assert_eq!(body["fileUrl"], "https://files/dune");
                    Json(json!({"id": "new-1", "status": "pending"}))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    async fn catalog() -> HttpBookCatalog {
        let base_url = spawn_backend().await;
        HttpBookCatalog::new(HttpBookCatalogConfig::new(base_url).with_timeout(5)).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = HttpBookCatalogConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_list_books() {
        let books = catalog().await.list_books().await.unwrap();

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].file_url, "https://f/b1.pdf");
        assert_eq!(books[1].status, BookStatus::Processing);
    }

    #[tokio::test]
    async fn test_get_book_not_found() {
        let catalog = catalog().await;

        assert_eq!(catalog.get_book(&BookId::from("b1")).await.unwrap().title, "Dune");
        let result = catalog.get_book(&BookId::from("zzz")).await;
        assert!(matches!(result, Err(CatalogError::NotFound(id)) if id == "zzz"));
    }

    #[tokio::test]
    async fn test_fetch_segments_returns_full_manifest() {
        let segments = catalog().await.fetch_segments(&BookId::from("b1")).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].status, SegmentStatus::Completed);
        assert_eq!(segments[1].status, SegmentStatus::Pending);
        assert_eq!(segments[0].book_id, BookId::from("b1"));
    }

    #[tokio::test]
    async fn test_relative_audio_url_resolves_against_backend() {
        let base_url = spawn_backend().await;
        let origin = base_url.trim_end_matches("/api").to_string();
        let catalog = HttpBookCatalog::new(HttpBookCatalogConfig::new(base_url)).unwrap();

        let segments = catalog.fetch_segments(&BookId::from("relative")).await.unwrap();

        assert_eq!(segments[0].audio_url, format!("{}/audio/tts-abc.mp3", origin));
        assert_eq!(segments[1].audio_url, "");
        assert_eq!(segments[1].status, SegmentStatus::Skipped);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpBookCatalog::new(HttpBookCatalogConfig::new("not a url"));
        assert!(matches!(result, Err(CatalogError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_fetch_segments_service_error() {
        let result = catalog().await.fetch_segments(&BookId::from("broken")).await;

        assert!(matches!(
            result,
            Err(CatalogError::ServiceError { status: 500, ref body }) if body == "db down"
        ));
    }

    #[tokio::test]
    async fn test_create_book() {
        let receipt = catalog()
            .await
            .create_book(CreateBookRequest {
                file_url: "https://files/dune".to_string(),
                title: "Dune".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.id, BookId::from("new-1"));
        assert_eq!(receipt.status, BookStatus::Pending);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let catalog =
            HttpBookCatalog::new(HttpBookCatalogConfig::new("http://127.0.0.1:9").with_timeout(2)).unwrap();

        let result = catalog.list_books().await;
        assert!(matches!(result, Err(CatalogError::NetworkError(_)) | Err(CatalogError::Timeout)));
    }
}
