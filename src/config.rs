//! 负责处理库的持久化配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

const CONFIG_FILE_NAME: &str = "config.json";

/// 默认的浏览器 User-Agent，用于抓取平台页面。
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 默认的音乐搜索接口。
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://meow.mangoi.in/search";

/// `DlKit` 的全局配置项。
///
/// 所有字段都有默认值，配置文件中缺失的字段会回退到默认值。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DlKitConfig {
    /// 每个 HTTP 请求的超时时间（秒）。
    pub timeout_secs: u64,
    /// 抓取页面时使用的 User-Agent。
    pub user_agent: String,
    /// 音乐搜索接口地址。
    pub search_endpoint: String,
    /// 合集富化时的最大并发数，`0` 表示不设上限（等于条目数量）。
    pub enrichment_concurrency: usize,
}

impl Default for DlKitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            enrichment_concurrency: 16,
        }
    }
}

impl DlKitConfig {
    /// 根据条目数量计算实际生效的并发上限，结果至少为 1。
    pub fn concurrency_for(&self, items: usize) -> usize {
        match self.enrichment_concurrency {
            0 => items.max(1),
            n => n.min(items.max(1)),
        }
    }
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "config.json"。
pub fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    if let Some(mut config_dir) = dirs::config_dir() {
        config_dir.push("dlkit-rs");
        fs::create_dir_all(&config_dir)?;
        config_dir.push(filename);
        Ok(config_dir)
    } else {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "无法找到用户配置目录").into())
    }
}

/// 从配置文件加载配置。文件不存在时返回默认配置。
pub fn load_config() -> Result<DlKitConfig> {
    load_config_from(&get_config_file_path(CONFIG_FILE_NAME)?)
}

/// 从指定路径加载配置。文件不存在时返回默认配置。
pub fn load_config_from(config_path: &Path) -> Result<DlKitConfig> {
    match fs::read_to_string(config_path) {
        Ok(content) => {
            let config: DlKitConfig = serde_json::from_str(&content)?;
            info!("[Config] 已从 {:?} 加载配置。", config_path);
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("[Config] 配置文件不存在，使用默认配置。");
            Ok(DlKitConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// 将配置序列化为 JSON 并保存到配置目录。
pub fn save_config(config: &DlKitConfig) -> Result<()> {
    save_config_to(&get_config_file_path(CONFIG_FILE_NAME)?, config)
}

/// 将配置序列化为 JSON 并保存到指定路径。
pub fn save_config_to(config_path: &Path, config: &DlKitConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content)?;
    info!("[Config] 配置已保存到 {:?}。", config_path);
    Ok(())
}
