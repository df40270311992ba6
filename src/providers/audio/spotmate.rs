//! spotmate.online 后端。
//!
//! 每次调用先请求首页拿到 CSRF 令牌和会话 Cookie，再带着它们提交转换请求。

use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, ORIGIN, REFERER, SET_COOKIE, USER_AGENT},
};
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{DlKitError, Result};
use crate::extractor::ValueExt;
use crate::providers::{BROWSER_USER_AGENT, Provider, ensure_success, parse_json_body};

const BASE_URL: &str = "https://spotmate.online";
const SESSION_COOKIE: &str = "spotmateonline_session";

static CSRF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="csrf-token"]"#).expect("编译 csrf-token 选择器失败")
});

#[derive(Serialize)]
struct ConvertPayload<'a> {
    urls: &'a str,
}

/// spotmate 提供商。
#[derive(Debug, Clone)]
pub struct SpotMate {
    http_client: Client,
}

impl SpotMate {
    /// 使用共享的 HTTP 客户端创建实例。
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    /// 首页握手，返回 `(csrf_token, session_cookie)`。
    async fn handshake(&self) -> Result<(String, String)> {
        let response = self
            .http_client
            .get(BASE_URL)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "text/html")
            .send()
            .await?;
        let response = ensure_success("spotmate", response).await?;

        let session = session_cookie(response.headers()).ok_or_else(|| {
            DlKitError::ApiError(format!("spotmate: 未找到会话 Cookie '{SESSION_COOKIE}'"))
        })?;
        let body = response.text().await?;
        let token = csrf_token(&body)
            .ok_or_else(|| DlKitError::ApiError("spotmate: 未找到 CSRF 令牌".to_string()))?;

        Ok((token, session))
    }
}

/// 从首页 HTML 中读取 `meta[name=csrf-token]`。
pub(crate) fn csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&CSRF_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 解析 `/convert` 的响应：`error: true` 视为失败，`url` 必须非空。
pub(crate) fn parse_convert_response(value: &Value) -> Result<String> {
    if value.get("error").and_then(Value::as_bool) == Some(true) {
        let message = value.str_at(&["message"]).unwrap_or("未知错误");
        return Err(DlKitError::ApiError(format!("spotmate: {message}")));
    }

    value
        .str_at(&["url"])
        .map(str::to_string)
        .ok_or_else(|| DlKitError::ApiError("spotmate: 响应中没有下载地址".to_string()))
}

#[async_trait]
impl Provider<String> for SpotMate {
    fn name(&self) -> &'static str {
        "spotmate"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    #[instrument(skip(self))]
    async fn stream(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(DlKitError::EmptyInput("spotmate: 链接不能为空".to_string()));
        }

        let (token, session) = self.handshake().await?;
        debug!("[SpotMate] 握手完成，开始提交转换请求");

        let response = self
            .http_client
            .post(format!("{BASE_URL}/convert"))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(CONTENT_TYPE, "application/json")
            .header("X-CSRF-Token", token)
            .header(REFERER, format!("{BASE_URL}/en"))
            .header(ORIGIN, BASE_URL)
            .header(COOKIE, format!("{SESSION_COOKIE}={session}"))
            .json(&ConvertPayload { urls: url })
            .send()
            .await?;
        let body = ensure_success("spotmate", response).await?.text().await?;

        parse_convert_response(&parse_json_body("spotmate", &body)?)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_csrf_token_from_meta() {
        let html = r#"<html><head><meta name="csrf-token" content="tok123"></head></html>"#;
        assert_eq!(csrf_token(html).as_deref(), Some("tok123"));
        assert_eq!(csrf_token("<html></html>"), None);
    }

    #[test]
    fn test_session_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("XSRF-TOKEN=abc; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("spotmateonline_session=s3ss10n; Path=/; HttpOnly"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("s3ss10n"));
    }

    #[test]
    fn test_parse_convert_response() {
        assert_eq!(
            parse_convert_response(&json!({"error": false, "url": "https://cdn.example/t.mp3"}))
                .expect("应当成功"),
            "https://cdn.example/t.mp3"
        );
        assert!(parse_convert_response(&json!({"error": true, "url": "x"})).is_err());
        assert!(parse_convert_response(&json!({"url": ""})).is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_stream() {
        let provider = SpotMate::new(Client::new());
        let url = provider
            .stream("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT")
            .await
            .expect("在线解析失败");
        assert!(url.starts_with("http"), "应返回直链");
    }
}
