//! 长视频平台的数据模型。

use serde::{Deserialize, Serialize};

use super::media::MediaSource;

/// 一个视频的规范记录。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoRecord {
    /// 11 位视频 ID。
    pub id: String,
    /// 规范观看地址。
    pub url: String,
    /// 标题。
    pub title: String,
    /// 频道名称。
    pub author: String,
    /// 缩略图。
    pub thumbnail: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 上传日期。
    pub upload_date: String,
}

/// `VideoService::stream` 的结果。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoStreamResult {
    /// 标题。
    pub caption: String,
    /// 缩略图。
    pub thumbnail: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 各个画质的媒体源。
    pub sources: Vec<MediaSource>,
}
