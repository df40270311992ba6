//! thesocialcat.com 后端。

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, USER_AGENT},
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::{DlKitError, Result};
use crate::extractor::ValueExt;
use crate::model::{MediaKind, MediaSource, PostStreamResult};
use crate::providers::{BROWSER_USER_AGENT, Provider, ensure_success, parse_json_body};

const BASE_URL: &str = "https://thesocialcat.com";

#[derive(Serialize)]
struct DownloadPayload<'a> {
    url: &'a str,
}

/// thesocialcat 提供商。
#[derive(Debug, Clone)]
pub struct TheSocialCat {
    http_client: Client,
}

impl TheSocialCat {
    /// 使用共享的 HTTP 客户端创建实例。
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

/// 解析下载接口的响应。
///
/// `mediaUrls` 中的所有链接共用顶层的 `type` 和 `thumbnail`。
pub(crate) fn parse_download_response(value: &Value) -> PostStreamResult {
    let kind = MediaKind::from_label(value.str_at(&["type"]).unwrap_or_default());
    let thumbnail = value.str_at(&["thumbnail"]).unwrap_or_default();

    let sources = value
        .get("mediaUrls")
        .map(Value::items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Value::as_str)
        .map(|url| MediaSource::new(url, kind).with_thumbnail(thumbnail))
        .collect();

    PostStreamResult::from_sources(
        value.str_at(&["caption"]).unwrap_or_default(),
        value.str_at(&["username"]).unwrap_or_default(),
        sources,
    )
}

#[async_trait]
impl Provider<PostStreamResult> for TheSocialCat {
    fn name(&self) -> &'static str {
        "thesocialcat"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    #[instrument(skip(self))]
    async fn stream(&self, url: &str) -> Result<PostStreamResult> {
        if url.trim().is_empty() {
            return Err(DlKitError::EmptyInput("thesocialcat: 链接不能为空".to_string()));
        }

        let response = self
            .http_client
            .post(format!("{BASE_URL}/api/instagram-download"))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(CONTENT_TYPE, "application/json")
            .json(&DownloadPayload { url })
            .send()
            .await?;
        let body = ensure_success("thesocialcat", response).await?.text().await?;

        Ok(parse_download_response(&parse_json_body("thesocialcat", &body)?))
    }
}
