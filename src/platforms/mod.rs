//! 平台服务
//!
//! 每个平台服务都按同样的流程工作：校验输入，抓取规范页面，提取字段并合并为规范记录，
//! 需要直链时再驱动该平台的提供商链。

pub mod audio;
pub mod pinboard;
pub mod short_video;
pub mod video;

pub use audio::AudioService;
pub use pinboard::PinboardService;
pub use short_video::ShortVideoService;
pub use video::VideoService;

use crate::error::{DlKitError, Result};

/// 去掉首尾空白，空输入返回 `EmptyInput`。
pub(crate) fn require_input(url: &str) -> Result<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DlKitError::EmptyInput("链接不能为空".to_string()));
    }
    Ok(url)
}
