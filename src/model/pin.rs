//! 图钉平台的数据模型。

use serde::{Deserialize, Serialize};

use super::media::MediaSource;

/// 一个图钉的规范记录。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinRecord {
    /// 图钉 ID。
    pub id: String,
    /// 跟随重定向之后的 URL。
    pub url: String,
    /// 标题。
    pub title: String,
    /// 描述。
    pub description: String,
    /// 图片。
    pub image: String,
    /// 作者。
    pub author: String,
    /// 发布日期。
    pub date: String,
}

/// `PinboardService::stream` 的结果。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinStreamResult {
    /// 标题。
    pub title: String,
    /// 缩略图。
    pub thumbnail: String,
    /// 媒体列表。
    pub source: Vec<MediaSource>,
}
