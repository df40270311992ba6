//! 图钉平台的提供商。

use reqwest::Client;

use super::Provider;
use crate::model::PinStreamResult;

pub mod savepin;

pub use savepin::SavePin;

/// 默认的图钉提供商链。
pub fn default_providers(client: &Client) -> Vec<Box<dyn Provider<PinStreamResult>>> {
    vec![Box::new(SavePin::new(client.clone()))]
}
