//! 原始页面抓取。
//!
//! `PageFetcher` 是各平台服务获取规范页面、嵌入页面和搜索接口原始内容的唯一入口，
//! 测试中可以替换为基于内存的实现。

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{DlKitError, Result};

/// 一次成功抓取的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// 跟随重定向之后的最终 URL。
    pub url: String,
    /// 响应正文。
    pub body: String,
}

impl FetchedPage {
    /// 便捷构造函数。
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// 对一个 URL 发起 GET 请求并返回原始正文。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取 `url`。网络错误和非 2xx 状态码都返回 `DlKitError::FetchFailed`。
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// 基于 `reqwest` 的默认实现。
///
/// User-Agent 与超时在构造 `Client` 时设定。
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// 使用一个已经配置好的 `Client` 创建抓取器。
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| DlKitError::FetchFailed(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DlKitError::FetchFailed(format!("{url}: HTTP {status}")));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| DlKitError::FetchFailed(format!("{url}: {e}")))?;

        debug!("[Fetch] {} -> {} ({} 字节)", url, final_url, body.len());
        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}
