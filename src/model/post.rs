//! 短视频平台的数据模型。

use serde::{Deserialize, Serialize};

use super::media::{MediaKind, MediaSource, index_sources};

/// 一个帖子的规范记录。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostRecord {
    /// 帖子短码，取自 `/p/<id>`、`/reel/<id>` 或 `/tv/<id>`。
    pub id: String,
    /// 规范 URL。
    pub url: String,
    /// 作者用户名。
    pub username: String,
    /// 点赞数原文。
    pub likes: String,
    /// 评论数原文。
    pub comments: String,
    /// 正文。
    pub caption: String,
    /// 发布日期，能识别时为 `YYYY-MM-DD`。
    pub date: String,
    /// 缩略图。
    pub thumbnail: String,
}

/// `ShortVideoService::stream` 的结果。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostStreamResult {
    /// 正文。
    pub caption: String,
    /// 作者用户名。
    pub username: String,
    /// 媒体总数。
    pub total: usize,
    /// 视频数量。
    pub video: usize,
    /// 图片数量。
    pub photo: usize,
    /// 媒体列表，视频在前，图片在后。
    pub source: Vec<MediaSource>,
}

impl PostStreamResult {
    /// 从媒体列表构造结果，编号与计数都从列表本身推导。
    pub fn from_sources(
        caption: impl Into<String>,
        username: impl Into<String>,
        sources: Vec<MediaSource>,
    ) -> Self {
        let source = index_sources(sources);
        let video = source.iter().filter(|s| s.kind == MediaKind::Video).count();
        let photo = source.iter().filter(|s| s.kind == MediaKind::Image).count();
        Self {
            caption: caption.into(),
            username: username.into(),
            total: video + photo,
            video,
            photo,
            source,
        }
    }
}
