//! 音乐平台的提供商。
//!
//! 这些后端都接收曲目页面链接，返回一个可直接下载的音频直链。

use reqwest::Client;

use super::Provider;

pub mod downloaderize;
pub mod spotmate;

pub use downloaderize::Downloaderize;
pub use spotmate::SpotMate;

/// 默认的音乐提供商链，按尝试顺序排列。
pub fn default_providers(client: &Client) -> Vec<Box<dyn Provider<String>>> {
    vec![
        Box::new(SpotMate::new(client.clone())),
        Box::new(Downloaderize::new(client.clone())),
    ]
}
