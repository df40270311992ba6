//! 所有平台共用的媒体源模型。

use serde::{Deserialize, Serialize};

/// 媒体源的分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// 视频。
    Video,
    /// 音频。
    Audio,
    /// 图片。
    Image,
    /// 无法识别。
    #[default]
    Unknown,
}

impl MediaKind {
    /// 从后端返回的类型标签推断分类，不区分大小写。
    ///
    /// `photo` 与 `image` 都视为图片。
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "video" | "mp4" => Self::Video,
            "audio" | "mp3" => Self::Audio,
            "image" | "photo" | "picture" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// 图片排在其他所有类型之后。
    fn rank(self) -> u8 {
        match self {
            Self::Image => 1,
            _ => 0,
        }
    }
}

/// 一个可以直接访问的媒体地址。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaSource {
    /// 直链。
    pub url: String,
    /// 分类。
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// 在所属列表中的序号，从 0 开始连续。
    pub index: usize,
    /// 画质/音质标签，例如 `720p`。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// 缩略图。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MediaSource {
    /// 创建一个尚未编号的媒体源。序号由 [`index_sources`] 统一分配。
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            kind,
            ..Default::default()
        }
    }

    /// 设置画质标签，空字符串视为没有。
    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into()).filter(|q| !q.trim().is_empty());
        self
    }

    /// 设置缩略图，空字符串视为没有。
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into()).filter(|t| !t.trim().is_empty());
        self
    }
}

/// 按默认合并顺序整理媒体源列表并重新编号。
///
/// 空 URL 的条目会被丢弃；图片稳定地移动到其他类型之后，其余条目保持后端返回的相对顺序；
/// 最后按位置分配从 0 开始的连续序号。
pub fn index_sources(sources: Vec<MediaSource>) -> Vec<MediaSource> {
    let mut sources: Vec<MediaSource> = sources
        .into_iter()
        .filter(|s| !s.url.trim().is_empty())
        .collect();
    sources.sort_by_key(|s| s.kind.rank());
    for (index, source) in sources.iter_mut().enumerate() {
        source.index = index;
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_sources_orders_videos_before_images() {
        let sources = vec![
            MediaSource::new("img-1", MediaKind::Image),
            MediaSource::new("vid-1", MediaKind::Video),
            MediaSource::new("", MediaKind::Video),
            MediaSource::new("img-2", MediaKind::Image),
            MediaSource::new("vid-2", MediaKind::Video),
        ];

        let indexed = index_sources(sources);
        let urls: Vec<_> = indexed.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["vid-1", "vid-2", "img-1", "img-2"]);

        let indices: Vec<_> = indexed.iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn test_media_kind_labels() {
        assert_eq!(MediaKind::from_label("Photo"), MediaKind::Image);
        assert_eq!(MediaKind::from_label(" video "), MediaKind::Video);
        assert_eq!(MediaKind::from_label("gif"), MediaKind::Unknown);
        assert_eq!(
            serde_json::to_string(&MediaKind::Image).unwrap(),
            r#""image""#
        );
    }
}
