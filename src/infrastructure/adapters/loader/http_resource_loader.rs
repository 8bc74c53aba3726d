//! HTTP Resource Loader - 后台下载音频资源
//!
//! 每个预加载在独立的 tokio 任务中执行，结果写入句柄后通过通道上报。
//! 预加载不设超时。

use reqwest::Client;
use tokio::sync::mpsc;

use crate::application::ports::{LoadError, PreloadOutcome, ResourceHandle, ResourceLoaderPort};

/// HTTP 资源加载器
#[derive(Clone, Default)]
pub struct HttpResourceLoader {
    client: Client,
}

impl HttpResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(client: &Client, url: &str) -> Result<Vec<u8>, LoadError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::NetworkError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl ResourceLoaderPort for HttpResourceLoader {
    fn begin_load(&self, handle: ResourceHandle, outcomes: mpsc::UnboundedSender<PreloadOutcome>) {
        let client = self.client.clone();
        tokio::spawn(async move {
            let fetched = Self::fetch(&client, handle.url()).await;
            let result = handle.complete(fetched);

            match &result {
                Ok(size) => tracing::debug!(
                    segment_id = %handle.segment_id(),
                    size = size,
                    "Preload completed"
                ),
                Err(LoadError::Released) => tracing::debug!(
                    segment_id = %handle.segment_id(),
                    "Preload finished after release, discarded"
                ),
                Err(e) => tracing::warn!(
                    segment_id = %handle.segment_id(),
                    url = %handle.url(),
                    error = %e,
                    "Preload failed"
                ),
            }

            let _ = outcomes.send(PreloadOutcome {
                segment_id: handle.segment_id().clone(),
                result,
            });
        });
    }
}
