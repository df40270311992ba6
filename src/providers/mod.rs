//! 提供商模块
//!
//! 该模块定义了所有后端适配器共同实现的 `Provider` 抽象，并按平台分组放置各个实现。
//! 每个适配器在每次调用时都独立完成自己的握手（令牌、nonce、会话 Cookie），
//! 适配器之间不共享任何可变状态。

use async_trait::async_trait;

use crate::error::Result;

pub mod audio;
pub mod pinboard;
pub mod short_video;
pub mod video;

/// 桌面浏览器 User-Agent，部分后端会拒绝没有它的请求。
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 一个能把平台条目解析为可直接访问的结果的后端。
///
/// `T` 是该平台的结果类型，例如音乐平台为直链字符串，短视频平台为 `PostStreamResult`。
#[async_trait]
pub trait Provider<T: Send>: Send + Sync {
    ///
    /// 返回提供商的唯一名称。
    ///
    /// 一个全小写的静态字符串，例如 `"spotmate"`, `"fastvideosave"`。
    ///
    fn name(&self) -> &'static str;

    /// 后端的根地址。
    fn base_url(&self) -> &'static str;

    ///
    /// 把一个平台条目的链接解析为结果。
    ///
    /// # 参数
    /// * `url` - 平台条目的规范链接。
    ///
    /// # 返回
    /// 成功时返回该后端给出的完整结果；任何一步失败都返回错误，不返回部分结果。
    ///
    async fn stream(&self, url: &str) -> Result<T>;
}

/// 检查响应状态码，非 2xx 时把正文截断后放入 `ApiError`。
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(crate::error::DlKitError::ApiError(format!(
        "{provider}: HTTP {status} {snippet}"
    )))
}

/// 把响应正文解析为 JSON，失败时返回 `ParseFailed`。
pub(crate) fn parse_json_body(provider: &str, body: &str) -> Result<serde_json::Value> {
    serde_json::from_str(body).map_err(|e| {
        crate::error::DlKitError::ParseFailed(format!("{provider} 返回了非 JSON 响应: {e}"))
    })
}
