//! spotify.downloaderize.com 后端（WordPress admin-ajax 接口）。

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{
    Client,
    header::{ACCEPT, ORIGIN, REFERER, USER_AGENT},
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{DlKitError, Result};
use crate::extractor::ValueExt;
use crate::providers::{BROWSER_USER_AGENT, Provider, ensure_success, parse_json_body};

const BASE_URL: &str = "https://spotify.downloaderize.com";
const AJAX_ACTION: &str = "spotify_downloader_get_info";

static NONCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""nonce":"([a-f0-9]+)""#).expect("编译 NONCE_REGEX 失败"));

/// downloaderize 提供商。
#[derive(Debug, Clone)]
pub struct Downloaderize {
    http_client: Client,
}

impl Downloaderize {
    /// 使用共享的 HTTP 客户端创建实例。
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    async fn fetch_nonce(&self) -> Result<String> {
        let response = self
            .http_client
            .get(BASE_URL)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "text/html")
            .send()
            .await?;
        let body = ensure_success("downloaderize", response).await?.text().await?;

        extract_nonce(&body)
            .ok_or_else(|| DlKitError::ApiError("downloaderize: 页面中没有 nonce".to_string()))
    }
}

pub(crate) fn extract_nonce(html: &str) -> Option<String> {
    NONCE_REGEX
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// 解析 admin-ajax 的响应。
///
/// `success: false` 视为失败，`data` 为字符串时作为错误信息；直链位于 `data.medias[0].url`。
pub(crate) fn parse_ajax_response(value: &Value) -> Result<String> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value.str_at(&["data"]).unwrap_or("接口返回失败");
        return Err(DlKitError::ApiError(format!("downloaderize: {message}")));
    }

    value
        .str_at(&["data", "medias", "0", "url"])
        .map(str::to_string)
        .ok_or_else(|| DlKitError::ApiError("downloaderize: 响应中没有下载地址".to_string()))
}

#[async_trait]
impl Provider<String> for Downloaderize {
    fn name(&self) -> &'static str {
        "downloaderize"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    #[instrument(skip(self))]
    async fn stream(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(DlKitError::EmptyInput("downloaderize: 链接不能为空".to_string()));
        }

        let nonce = self.fetch_nonce().await?;
        debug!("[Downloaderize] 获取 nonce 成功");

        let form = [("action", AJAX_ACTION), ("url", url), ("nonce", nonce.as_str())];
        let response = self
            .http_client
            .post(format!("{BASE_URL}/wp-admin/admin-ajax.php"))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header(REFERER, format!("{BASE_URL}/"))
            .header(ORIGIN, BASE_URL)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .send()
            .await?;
        let body = ensure_success("downloaderize", response).await?.text().await?;

        parse_ajax_response(&parse_json_body("downloaderize", &body)?)
    }
}
