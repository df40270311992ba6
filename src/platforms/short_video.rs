//! 短视频平台服务。

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, instrument};

use super::require_input;
use crate::builder::post::{build_post_record, is_post_url};
use crate::dispatch::ProviderChain;
use crate::error::{DlKitError, Result};
use crate::extractor::extract_page;
use crate::fetch::PageFetcher;
use crate::model::{PostRecord, PostStreamResult};
use crate::providers::{self, Provider};

/// 短视频帖子（图文、Reels）的入口。
pub struct ShortVideoService {
    fetcher: Arc<dyn PageFetcher>,
    chain: ProviderChain<PostStreamResult>,
}

impl ShortVideoService {
    /// 使用默认提供商链创建服务。
    pub fn new(client: &Client, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_components(fetcher, providers::short_video::default_providers(client))
    }

    /// 使用自定义的抓取器与提供商链创建服务。
    pub fn with_components(
        fetcher: Arc<dyn PageFetcher>,
        providers: Vec<Box<dyn Provider<PostStreamResult>>>,
    ) -> Self {
        Self {
            fetcher,
            chain: ProviderChain::new("short_video", providers),
        }
    }

    /// 按名称取出单个提供商。
    pub fn provider(&self, name: &str) -> Result<&dyn Provider<PostStreamResult>> {
        self.chain.provider(name)
    }

    /// 提供商名称，按尝试顺序排列。
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    ///
    /// 获取帖子的规范记录。
    ///
    /// 链接形状不匹配时直接返回 `InvalidUrl`，不会发出任何请求。
    /// 页面上没有任何可识别的元数据时返回全空字段的记录，而不是错误。
    ///
    #[instrument(skip(self))]
    pub async fn get_info(&self, url: &str) -> Result<PostRecord> {
        let url = require_input(url)?;
        if !is_post_url(url) {
            return Err(DlKitError::InvalidUrl(url.to_string()));
        }

        let page = self.fetcher.fetch(url).await?;
        let extract = extract_page(&page.body, &[]);
        if extract.is_empty() {
            debug!("[ShortVideo] {} 页面上没有可识别的元数据", page.url);
        }
        Ok(build_post_record(url, &page.url, &extract))
    }

    ///
    /// 解析帖子中全部媒体的直链。
    ///
    /// 先获取规范记录，再依次尝试提供商；胜出结果中缺失的正文和作者由规范记录补齐。
    ///
    #[instrument(skip(self))]
    pub async fn stream(&self, url: &str) -> Result<PostStreamResult> {
        let record = self.get_info(url).await?;
        self.chain.stream_backfilled(url.trim(), &record).await
    }
}
