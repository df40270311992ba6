//! vidfly.ai 后端。

use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};
use serde_json::Value;
use tracing::instrument;

use crate::builder::video::is_video_url;
use crate::error::{DlKitError, Result};
use crate::extractor::ValueExt;
use crate::model::{MediaKind, MediaSource, VideoStreamResult, index_sources};
use crate::providers::{BROWSER_USER_AGENT, Provider, ensure_success, parse_json_body};

const BASE_URL: &str = "https://api.vidfly.ai";

/// vidfly 提供商。
#[derive(Debug, Clone)]
pub struct VidFly {
    http_client: Client,
}

impl VidFly {
    /// 使用共享的 HTTP 客户端创建实例。
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

/// 由高度或音频标签得出画质描述。
///
/// 高度大于 0 时为 `"<height>p"`；音频取标签括号内的文字，标签为空时为 `"audio"`；其余为 `"N/A"`。
pub(crate) fn quality_label(item: &Value) -> String {
    if let Some(height) = item.u64_at(&["height"]).filter(|h| *h > 0) {
        return format!("{height}p");
    }

    if item.str_at(&["type"]) == Some("audio") {
        let label = item.str_at(&["label"]).unwrap_or_default();
        if label.is_empty() {
            return "audio".to_string();
        }
        return match label.split('(').nth(1) {
            Some(inner) => inner.trim().trim_end_matches(')').trim().to_string(),
            None => label.to_string(),
        };
    }

    "N/A".to_string()
}

/// 解析下载接口的响应。缺少 `data` 对象时返回 `ParseFailed`。
pub(crate) fn parse_response(value: &Value) -> Result<VideoStreamResult> {
    let data = value
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| DlKitError::ParseFailed("vidfly: 响应缺少 data 字段".to_string()))?;

    let sources = index_sources(
        data.get("items")
            .map(Value::items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let url = item.str_at(&["url"])?;
                let kind = MediaKind::from_label(item.str_at(&["type"]).unwrap_or_default());
                Some(MediaSource::new(url, kind).with_quality(quality_label(item)))
            })
            .collect(),
    );

    Ok(VideoStreamResult {
        caption: data.str_at(&["title"]).unwrap_or_default().to_string(),
        thumbnail: data.str_at(&["cover"]).unwrap_or_default().to_string(),
        duration: data.u64_at(&["duration"]).unwrap_or_default(),
        sources,
    })
}

#[async_trait]
impl Provider<VideoStreamResult> for VidFly {
    fn name(&self) -> &'static str {
        "vidfly"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    #[instrument(skip(self))]
    async fn stream(&self, url: &str) -> Result<VideoStreamResult> {
        if url.trim().is_empty() {
            return Err(DlKitError::EmptyInput("vidfly: 链接不能为空".to_string()));
        }
        if !is_video_url(url) {
            return Err(DlKitError::InvalidUrl(format!("vidfly: 不支持的链接 {url}")));
        }

        let response = self
            .http_client
            .get(format!("{BASE_URL}/api/media/youtube/download"))
            .query(&[("url", url)])
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;
        let body = ensure_success("vidfly", response).await?.text().await?;

        parse_response(&parse_json_body("vidfly", &body)?)
    }
}
