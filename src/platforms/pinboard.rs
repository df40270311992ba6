//! 图钉平台服务。

use std::sync::Arc;

use reqwest::Client;
use tracing::instrument;

use super::require_input;
use crate::builder::pin::{build_pin_record, is_pin_url};
use crate::dispatch::ProviderChain;
use crate::error::{DlKitError, Result};
use crate::extractor::extract_page;
use crate::fetch::PageFetcher;
use crate::model::{PinRecord, PinStreamResult};
use crate::providers::{self, Provider};

/// 图钉的入口。
pub struct PinboardService {
    fetcher: Arc<dyn PageFetcher>,
    chain: ProviderChain<PinStreamResult>,
}

impl PinboardService {
    /// 使用默认提供商链创建服务。
    pub fn new(client: &Client, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_components(fetcher, providers::pinboard::default_providers(client))
    }

    /// 使用自定义的抓取器与提供商链创建服务。
    pub fn with_components(
        fetcher: Arc<dyn PageFetcher>,
        providers: Vec<Box<dyn Provider<PinStreamResult>>>,
    ) -> Self {
        Self {
            fetcher,
            chain: ProviderChain::new("pinboard", providers),
        }
    }

    /// 按名称取出单个提供商。
    pub fn provider(&self, name: &str) -> Result<&dyn Provider<PinStreamResult>> {
        self.chain.provider(name)
    }

    /// 获取图钉的规范记录。`pin.it` 短链接会在抓取时跟随重定向。
    #[instrument(skip(self))]
    pub async fn get_info(&self, url: &str) -> Result<PinRecord> {
        let url = require_input(url)?;
        if !is_pin_url(url) {
            return Err(DlKitError::InvalidUrl(url.to_string()));
        }

        let page = self.fetcher.fetch(url).await?;
        Ok(build_pin_record(url, &page.url, &extract_page(&page.body, &[])))
    }

    /// 解析图钉的直链，标题和缩略图缺失时由规范记录补齐。
    #[instrument(skip(self))]
    pub async fn stream(&self, url: &str) -> Result<PinStreamResult> {
        let record = self.get_info(url).await?;
        self.chain.stream_backfilled(url.trim(), &record).await
    }
}
