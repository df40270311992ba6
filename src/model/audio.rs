//! 音乐平台的数据模型：规范记录、流结果与搜索结果。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::media::MediaSource;

/// 音乐条目的类型，从最终 URL 的路径中推断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// 单曲。
    Track,
    /// 专辑。
    Album,
    /// 歌单。
    Playlist,
    /// 无法识别，下游需要能处理这种情况。
    #[default]
    Unknown,
}

impl ItemKind {
    /// 从路径段 `track`/`album`/`playlist` 解析。
    pub fn from_segment(segment: &str) -> Self {
        match segment.to_ascii_lowercase().as_str() {
            "track" => Self::Track,
            "album" => Self::Album,
            "playlist" => Self::Playlist,
            _ => Self::Unknown,
        }
    }

    /// 小写名称。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Unknown => "unknown",
        }
    }

    /// 是否为包含多首曲目的合集。
    pub fn is_collection(self) -> bool {
        matches!(self, Self::Album | Self::Playlist)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 合集中的一首曲目。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackInfo {
    /// 曲名。
    pub name: String,
    /// 艺术家，多位时以 `, ` 连接。
    pub artist: String,
    /// 试听地址。
    pub preview_url: String,
    /// 曲目页面地址。
    pub url: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 发行日期。
    pub release_date: String,
    /// 封面。
    pub image: String,
}

impl TrackInfo {
    /// 所有元数据字段均已填充。
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.artist.is_empty()
            && !self.image.is_empty()
            && !self.preview_url.is_empty()
            && !self.release_date.is_empty()
            && self.duration > 0
    }
}

/// 一个音乐条目合并后的规范记录。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioRecord {
    /// 条目类型。
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// 从 URL 路径中取出的 ID。
    pub id: String,
    /// 跟随重定向之后的规范 URL。
    pub url: String,
    /// 名称。
    pub name: String,
    /// 艺术家或合集副标题。
    pub artist: String,
    /// 封面。
    pub image: String,
    /// 试听地址。
    pub preview_url: String,
    /// 时长（秒），合集为 0。
    pub duration: u64,
    /// 发行日期。
    pub release_date: String,
    /// 曲目列表。单曲时通常只有自身一项。
    pub tracks: Vec<TrackInfo>,
}

/// 流结果中的一首曲目。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackSource {
    /// 曲名。
    pub title: String,
    /// 艺术家。
    pub artist: String,
    /// 封面。
    pub image: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 发行日期。
    pub release_date: String,
    /// 直链及其编号。
    #[serde(flatten)]
    pub source: MediaSource,
}

/// `AudioService::stream` 的结果。
///
/// 合集中所有提供商都失败的曲目不会出现在 `source` 中，
/// 因此 `source` 的长度可能小于曲目数量。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioStreamResult {
    /// 规范 URL。
    pub url: String,
    /// 条目 ID。
    pub id: String,
    /// 条目类型。
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// 成功解析出直链的曲目，按原始曲目顺序排列。
    pub source: Vec<TrackSource>,
}

/// 搜索接口返回的单条结果。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// ID。
    pub id: String,
    /// 页面地址。
    pub url: String,
    /// 封面。
    pub image: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 艺术家。
    pub artists: String,
    /// 结果类型。
    #[serde(rename = "type")]
    pub kind: String,
    /// 名称。
    pub name: String,
    /// 专辑名。
    pub album: String,
    /// 发行日期。
    pub release_date: String,
    /// 试听地址。
    pub preview_url: String,
}

/// 搜索接口的完整响应。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    /// 查询词。
    pub query: String,
    /// 搜索类型。
    #[serde(rename = "type")]
    pub kind: String,
    /// 返回条数上限。
    pub limit: u32,
    /// 结果总数。
    pub total_results: u32,
    /// 结果列表。
    pub results: Vec<SearchResult>,
}
