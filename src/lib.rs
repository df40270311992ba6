#![warn(missing_docs)]

//! # DlKit RS
//!
//! 一个 Rust 库，用于从多个非官方后端获取音乐、短视频、图钉和长视频的元数据与直链。
//!
//! ## 主要功能
//!
//! - **元数据**: 抓取平台页面，从内嵌状态、ld+json 结构化数据和 meta 标签中提取字段，
//!   合并为每个平台的规范记录。歌单和专辑中缺失信息的曲目会被并发地逐首补全。
//! - **直链**: 每个平台维护一个有序的提供商链，依次尝试，返回第一个可用结果；
//!   也可以按名称直接取出某个提供商。
//! - **搜索**: 音乐平台额外提供搜索接口。
//!
//! ## 获取直链
//!
//! ```rust,no_run
//! use dlkit_rs::DlKit;
//!
//! async {
//!     let kit = DlKit::new().unwrap();
//!
//!     match kit.audio.stream("https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy").await {
//!         Ok(result) => {
//!             for track in &result.source {
//!                 println!("{} - {}: {}", track.source.index, track.title, track.source.url);
//!             }
//!         }
//!         Err(e) => eprintln!("发生错误: {}", e),
//!     }
//!
//!     let post = kit
//!         .short_video
//!         .stream("https://www.instagram.com/reel/DN6IZn3Eh2z/")
//!         .await;
//!     println!("{:?}", post.map(|p| p.total));
//! };
//! ```
//!
//! 合集的直链结果可能少于曲目数量：所有提供商都失败的曲目会被省略。
pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod model;
pub mod platforms;
pub mod providers;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

pub use crate::{
    config::DlKitConfig,
    error::{DlKitError, Result},
    fetch::{FetchedPage, HttpFetcher, PageFetcher},
    platforms::{AudioService, PinboardService, ShortVideoService, VideoService},
};

/// 顶层客户端，持有每个平台的服务以及它们共享的 HTTP 客户端。
///
/// 这是与本库交互的主要入口点。
pub struct DlKit {
    /// 音乐平台（单曲、专辑、歌单）。
    pub audio: AudioService,
    /// 短视频帖子。
    pub short_video: ShortVideoService,
    /// 图钉。
    pub pinboard: PinboardService,
    /// 长视频。
    pub video: VideoService,
    config: DlKitConfig,
}

impl DlKit {
    /// 使用默认配置创建客户端。
    pub fn new() -> Result<Self> {
        Self::with_config(DlKitConfig::default())
    }

    /// 从配置文件加载配置并创建客户端，文件不存在时使用默认配置。
    pub fn from_config_file() -> Result<Self> {
        Self::with_config(config::load_config()?)
    }

    /// 使用给定配置创建客户端。
    pub fn with_config(config: DlKitConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(client.clone()));

        let kit = Self {
            audio: AudioService::new(&client, Arc::clone(&fetcher), &config),
            short_video: ShortVideoService::new(&client, Arc::clone(&fetcher)),
            pinboard: PinboardService::new(&client, Arc::clone(&fetcher)),
            video: VideoService::new(&client, fetcher),
            config,
        };

        info!(
            "[Main] DlKit 初始化成功，音乐提供商: {:?}，短视频提供商: {:?}",
            kit.audio.provider_names(),
            kit.short_video.provider_names()
        );
        Ok(kit)
    }

    /// 当前生效的配置。
    pub fn config(&self) -> &DlKitConfig {
        &self.config
    }
}
