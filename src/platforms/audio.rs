//! 音乐平台服务。

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::builder::audio::{
    AudioRecordBuilder, EMBED_STATE_IDS, PRIMARY_STATE_IDS, backfill_track, normalise_input,
};
use crate::config::DlKitConfig;
use crate::dispatch::{ProviderChain, fan_out};
use crate::error::{DlKitError, Result};
use crate::extractor::extract_page;
use crate::fetch::PageFetcher;
use crate::model::{
    AudioRecord, AudioStreamResult, ItemKind, MediaKind, MediaSource, SearchResponse, TrackInfo,
    TrackSource,
};
use crate::providers::{self, Provider};

/// 音乐平台（单曲、专辑、歌单）的入口。
pub struct AudioService {
    fetcher: Arc<dyn PageFetcher>,
    chain: ProviderChain<String>,
    config: DlKitConfig,
}

impl AudioService {
    /// 使用默认提供商链创建服务。
    pub fn new(client: &Client, fetcher: Arc<dyn PageFetcher>, config: &DlKitConfig) -> Self {
        Self::with_components(fetcher, providers::audio::default_providers(client), config)
    }

    /// 使用自定义的抓取器与提供商链创建服务。
    pub fn with_components(
        fetcher: Arc<dyn PageFetcher>,
        providers: Vec<Box<dyn Provider<String>>>,
        config: &DlKitConfig,
    ) -> Self {
        Self {
            fetcher,
            chain: ProviderChain::new("audio", providers),
            config: config.clone(),
        }
    }

    /// 按名称取出单个提供商。
    pub fn provider(&self, name: &str) -> Result<&dyn Provider<String>> {
        self.chain.provider(name)
    }

    /// 提供商名称，按尝试顺序排列。
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    ///
    /// 获取一个单曲、专辑或歌单的规范记录。
    ///
    /// 接受网页链接或 `spotify:<type>:<id>` 形式的 URI。合集中元数据不完整的曲目会被并发地
    /// 逐首解析补齐；某首曲目解析失败时保留它原有的字段，不影响整体结果。
    ///
    /// # 返回
    /// * `EmptyInput` - 输入为空。
    /// * `InvalidUrl` - 输入不是 http(s) 链接。
    /// * `FetchFailed` - 主页面抓取失败。
    ///
    #[instrument(skip(self))]
    pub async fn get_info(&self, url: &str) -> Result<AudioRecord> {
        let input = normalise_input(url);
        if input.is_empty() {
            return Err(DlKitError::EmptyInput("链接或 ID 不能为空".to_string()));
        }
        if !(input.starts_with("https://") || input.starts_with("http://")) {
            return Err(DlKitError::InvalidUrl(input));
        }

        let mut record = self.resolve_record(&input).await?;
        if record.kind.is_collection() {
            self.enrich_tracks(&mut record.tracks).await;
        }

        info!(
            "[Audio] 已解析 {} '{}'，共 {} 首曲目",
            record.kind,
            record.name,
            record.tracks.len()
        );
        Ok(record)
    }

    /// 抓取主页面（必要时加上嵌入页）并合并为规范记录，不做曲目补全。
    async fn resolve_record(&self, url: &str) -> Result<AudioRecord> {
        let page = self.fetcher.fetch(url).await?;
        let mut builder = AudioRecordBuilder::new(&page.url);
        builder.absorb_page(&extract_page(&page.body, PRIMARY_STATE_IDS));

        if builder.needs_embed() {
            if let Some(embed) = builder.embed_url() {
                debug!("[Audio] 主页面信息不足，回退到嵌入页 {}", embed);
                match self.fetcher.fetch(&embed).await {
                    Ok(embed_page) => {
                        builder.absorb_embed(&extract_page(&embed_page.body, EMBED_STATE_IDS));
                    }
                    Err(e) => warn!("[Audio] 嵌入页 {} 抓取失败: {}", embed, e),
                }
            }
        }

        Ok(builder.finish())
    }

    /// 并发补全合集中的曲目。结果按曲目原始位置写回。
    async fn enrich_tracks(&self, tracks: &mut [TrackInfo]) {
        let pending: Vec<(usize, String)> = tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| !track.is_complete() && !track.url.is_empty())
            .map(|(index, track)| (index, track.url.clone()))
            .collect();
        if pending.is_empty() {
            return;
        }

        let limit = self.config.concurrency_for(pending.len());
        let resolved = fan_out(pending, limit, |(index, url)| async move {
            let result = self.resolve_record(&url).await;
            (index, url, result)
        })
        .await;

        for (index, url, result) in resolved {
            match result {
                Ok(record) => backfill_track(&mut tracks[index], &record),
                Err(e) => warn!("[Audio] 第 {} 首曲目 {} 补全失败: {}", index, url, e),
            }
        }
    }

    ///
    /// 为条目中的每一首曲目解析直链。
    ///
    /// 所有曲目并发解析。所有提供商都失败的曲目会从结果中省略，
    /// 因此返回的 `source` 可能少于曲目数量，这是预期行为；剩余条目按原始曲目顺序排列，
    /// `index` 从 0 开始连续编号。
    ///
    /// # 返回
    /// 条目类型无法识别时返回 `InvalidUrl`。
    ///
    #[instrument(skip(self))]
    pub async fn stream(&self, url: &str) -> Result<AudioStreamResult> {
        let record = self.get_info(url).await?;
        if record.kind == ItemKind::Unknown {
            return Err(DlKitError::InvalidUrl(format!(
                "无法识别条目类型: {}",
                record.url
            )));
        }

        let targets: Vec<TrackInfo> = if record.tracks.is_empty() {
            vec![TrackInfo {
                name: record.name.clone(),
                artist: record.artist.clone(),
                url: record.url.clone(),
                image: record.image.clone(),
                duration: record.duration,
                release_date: record.release_date.clone(),
                preview_url: record.preview_url.clone(),
            }]
        } else {
            record.tracks.clone()
        };
        let total = targets.len();

        let limit = self.config.concurrency_for(total);
        let resolved = fan_out(targets, limit, |track| async move {
            let result = self.chain.stream(&track.url).await;
            (track, result)
        })
        .await;

        let source: Vec<TrackSource> = resolved
            .into_iter()
            .filter_map(|(track, result)| match result {
                Ok(stream_url) => Some((track, stream_url)),
                Err(e) => {
                    warn!("[Audio] 曲目 '{}' 没有可用直链: {}", track.name, e);
                    None
                }
            })
            .enumerate()
            .map(|(index, (track, stream_url))| TrackSource {
                title: track.name,
                artist: track.artist,
                image: track.image,
                duration: track.duration,
                release_date: track.release_date,
                source: MediaSource {
                    index,
                    ..MediaSource::new(stream_url, MediaKind::Audio)
                },
            })
            .collect();

        info!(
            "[Audio] {} 共 {} 首曲目，解析出 {} 个直链",
            record.url,
            total,
            source.len()
        );
        Ok(AudioStreamResult {
            url: record.url,
            id: record.id,
            kind: record.kind,
            source,
        })
    }

    ///
    /// 调用固定的搜索接口。
    ///
    /// # 参数
    /// * `query` - 查询词，不能为空。
    /// * `kind` - 搜索类型，省略或为空时为 `"all"`。
    ///
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, kind: Option<&str>) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DlKitError::EmptyInput("搜索词不能为空".to_string()));
        }
        let kind = kind.map(str::trim).filter(|k| !k.is_empty()).unwrap_or("all");

        let url = format!(
            "{}?q={}&type={}",
            self.config.search_endpoint,
            urlencoding::encode(query),
            urlencoding::encode(kind)
        );
        let page = self.fetcher.fetch(&url).await?;

        serde_json::from_str(&page.body)
            .map_err(|e| DlKitError::ParseFailed(format!("搜索接口返回了无法解析的内容: {e}")))
    }
}
