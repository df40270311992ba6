//! fastvideosave（api.videodropper.app）后端。

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, ORIGIN, REFERER, USER_AGENT},
};
use serde_json::Value;
use tracing::instrument;

use super::crypto::encrypt_url;
use crate::error::{DlKitError, Result};
use crate::extractor::ValueExt;
use crate::model::{MediaKind, MediaSource, PostStreamResult};
use crate::providers::{BROWSER_USER_AGENT, Provider, ensure_success, parse_json_body};

const BASE_URL: &str = "https://api.videodropper.app";
const SITE_URL: &str = "https://fastvideo.net";

/// fastvideosave 提供商。
#[derive(Debug, Clone)]
pub struct FastVideoSave {
    http_client: Client,
}

impl FastVideoSave {
    /// 使用共享的 HTTP 客户端创建实例。
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

/// 解析 `/allinone` 的响应。
///
/// `video` 数组的元素可以是字符串，也可以是 `{video, thumbnail}` 对象；`image` 数组只含字符串。
/// 该接口不返回正文和作者，这两个字段留空，由调度器用规范记录补齐。
pub(crate) fn parse_allinone(value: &Value) -> PostStreamResult {
    let videos = value
        .get("video")
        .map(Value::items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(url) => Some(MediaSource::new(url.as_str(), MediaKind::Video)),
            Value::Object(_) => entry.str_at(&["video"]).map(|url| {
                MediaSource::new(url, MediaKind::Video)
                    .with_thumbnail(entry.str_at(&["thumbnail"]).unwrap_or_default())
            }),
            _ => None,
        });

    let images = value
        .get("image")
        .map(Value::items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Value::as_str)
        .map(|url| MediaSource::new(url, MediaKind::Image));

    PostStreamResult::from_sources("", "", videos.chain(images).collect())
}

#[async_trait]
impl Provider<PostStreamResult> for FastVideoSave {
    fn name(&self) -> &'static str {
        "fastvideosave"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    #[instrument(skip(self))]
    async fn stream(&self, url: &str) -> Result<PostStreamResult> {
        if url.trim().is_empty() {
            return Err(DlKitError::EmptyInput("fastvideosave: 链接不能为空".to_string()));
        }

        let encrypted = encrypt_url(url)?;
        let response = self
            .http_client
            .get(format!("{BASE_URL}/allinone"))
            .header(ACCEPT, "*/*")
            .header(ORIGIN, SITE_URL)
            .header(REFERER, format!("{SITE_URL}/"))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header("Url", encrypted)
            .send()
            .await?;
        let body = ensure_success("fastvideosave", response).await?.text().await?;

        Ok(parse_allinone(&parse_json_body("fastvideosave", &body)?))
    }
}
