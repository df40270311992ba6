//! 短视频平台的提供商。

use reqwest::Client;

use super::Provider;
use crate::model::PostStreamResult;

pub mod crypto;
pub mod fastvideosave;
pub mod thesocialcat;

pub use fastvideosave::FastVideoSave;
pub use thesocialcat::TheSocialCat;

/// 默认的短视频提供商链，按尝试顺序排列。
pub fn default_providers(client: &Client) -> Vec<Box<dyn Provider<PostStreamResult>>> {
    vec![
        Box::new(FastVideoSave::new(client.clone())),
        Box::new(TheSocialCat::new(client.clone())),
    ]
}
