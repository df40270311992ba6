//! 长视频平台的提供商。

use reqwest::Client;

use super::Provider;
use crate::model::VideoStreamResult;

pub mod vidfly;

pub use vidfly::VidFly;

/// 默认的长视频提供商链。
pub fn default_providers(client: &Client) -> Vec<Box<dyn Provider<VideoStreamResult>>> {
    vec![Box::new(VidFly::new(client.clone()))]
}
