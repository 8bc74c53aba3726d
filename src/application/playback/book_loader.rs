//! Book Audio Loader - 获取片段清单并过滤出可播放片段

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::BookCatalogPort;
use crate::domain::book::Book;
use crate::domain::playback::ActiveSegmentList;

/// 已获取并过滤的书籍清单
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub book: Book,
    pub segments: ActiveSegmentList,
    /// 原始清单长度（包含未就绪片段）
    pub manifest_len: usize,
}

/// 书籍音频加载器
#[derive(Clone)]
pub struct BookAudioLoader {
    catalog: Arc<dyn BookCatalogPort>,
}

impl BookAudioLoader {
    pub fn new(catalog: Arc<dyn BookCatalogPort>) -> Self {
        Self { catalog }
    }

    /// 获取片段清单，只保留 completed 片段
    ///
    /// 失败时返回 `ApplicationError::ManifestFetch`，不自动重试
    pub async fn fetch(&self, book: Book) -> Result<LoadedManifest, ApplicationError> {
        let manifest = match self.catalog.fetch_segments(&book.id).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(book_id = %book.id, error = %e, "Failed to fetch audio segments");
                return Err(ApplicationError::manifest_fetch(book.id.clone(), e));
            }
        };

        let manifest_len = manifest.len();
        let segments = ActiveSegmentList::from_manifest(manifest);

        tracing::info!(
            book_id = %book.id,
            manifest_len = manifest_len,
            ready = segments.len(),
            "Audio segment manifest fetched"
        );

        Ok(LoadedManifest {
            book,
            segments,
            manifest_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::playback::testing::StaticCatalog;
    use crate::domain::book::{AudioSegment, BookId, SegmentStatus};

    fn seg(id: &str, status: SegmentStatus) -> AudioSegment {
        AudioSegment::new(id, BookId::from("b1"), "", format!("https://a/{id}.mp3"), status)
    }

    #[tokio::test]
    async fn test_fetch_filters_manifest() {
        let catalog = StaticCatalog::new().with_manifest(
            "b1",
            vec![
                seg("s0", SegmentStatus::Completed),
                seg("s1", SegmentStatus::Completed),
                seg("s2", SegmentStatus::Pending),
                seg("s3", SegmentStatus::Completed),
            ],
        );
        let loader = BookAudioLoader::new(Arc::new(catalog));

        let loaded = loader.fetch(Book::from_id(BookId::from("b1"))).await.unwrap();

        assert_eq!(loaded.manifest_len, 4);
        let ids: Vec<&str> = loaded.segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s0", "s1", "s3"]);
    }

    #[tokio::test]
    async fn test_fetch_drops_skipped_and_unrecognised_segments() {
        let manifest: Vec<AudioSegment> = serde_json::from_str(
            r#"[
                {"id": "s0", "bookId": "b1", "audioUrl": "https://a/s0.mp3", "status": "completed"},
                {"id": "s1", "bookId": "b1", "audioUrl": "", "status": "skipped"},
                {"id": "s2", "bookId": "b1", "audioUrl": "", "status": "queued"},
                {"id": "s3", "bookId": "b1", "audioUrl": "https://a/s3.mp3", "status": "completed"}
            ]"#,
        )
        .unwrap();
        let catalog = StaticCatalog::new().with_manifest("b1", manifest);
        let loader = BookAudioLoader::new(Arc::new(catalog));

        let loaded = loader.fetch(Book::from_id(BookId::from("b1"))).await.unwrap();

        assert_eq!(loaded.manifest_len, 4);
        let ids: Vec<&str> = loaded.segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s0", "s3"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_manifest_error() {
        let loader = BookAudioLoader::new(Arc::new(StaticCatalog::new()));

        let result = loader.fetch(Book::from_id(BookId::from("missing"))).await;

        assert!(matches!(result, Err(ref e) if e.is_manifest_fetch()));
    }
}
