//! 长视频平台服务。

use std::sync::Arc;

use reqwest::Client;
use tracing::instrument;

use super::require_input;
use crate::builder::video::{build_video_record, is_video_url, video_id, watch_url};
use crate::dispatch::ProviderChain;
use crate::error::{DlKitError, Result};
use crate::extractor::extract_page;
use crate::fetch::PageFetcher;
use crate::model::{VideoRecord, VideoStreamResult};
use crate::providers::{self, Provider};

/// 长视频的入口。
pub struct VideoService {
    fetcher: Arc<dyn PageFetcher>,
    chain: ProviderChain<VideoStreamResult>,
}

impl VideoService {
    /// 使用默认提供商链创建服务。
    pub fn new(client: &Client, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_components(fetcher, providers::video::default_providers(client))
    }

    /// 使用自定义的抓取器与提供商链创建服务。
    pub fn with_components(
        fetcher: Arc<dyn PageFetcher>,
        providers: Vec<Box<dyn Provider<VideoStreamResult>>>,
    ) -> Self {
        Self {
            fetcher,
            chain: ProviderChain::new("video", providers),
        }
    }

    /// 按名称取出单个提供商。
    pub fn provider(&self, name: &str) -> Result<&dyn Provider<VideoStreamResult>> {
        self.chain.provider(name)
    }

    ///
    /// 获取视频的规范记录。
    ///
    /// 链接必须能取出 11 位视频 ID；频道链接虽然形状合法，但没有 ID，同样返回 `InvalidUrl`。
    /// 页面总是按规范观看地址抓取。
    ///
    #[instrument(skip(self))]
    pub async fn get_info(&self, url: &str) -> Result<VideoRecord> {
        let url = require_input(url)?;
        if !is_video_url(url) {
            return Err(DlKitError::InvalidUrl(url.to_string()));
        }
        let id = video_id(url)
            .ok_or_else(|| DlKitError::InvalidUrl(format!("无法从链接中取出视频 ID: {url}")))?;

        let page = self.fetcher.fetch(&watch_url(&id)).await?;
        Ok(build_video_record(&id, &extract_page(&page.body, &[])))
    }

    /// 解析视频的全部直链，标题、缩略图和时长缺失时由规范记录补齐。
    #[instrument(skip(self))]
    pub async fn stream(&self, url: &str) -> Result<VideoStreamResult> {
        let record = self.get_info(url).await?;
        self.chain.stream_backfilled(url.trim(), &record).await
    }
}
