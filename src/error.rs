//! 定义了整个 `dlkit-rs` 库的错误类型 `DlKitError`。

use std::io;
use thiserror::Error;

/// `dlkit-rs` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum DlKitError {
    /// 输入为空（URL、查询词或提供商名称）
    #[error("输入不能为空: {0}")]
    EmptyInput(String),

    /// URL 不符合平台的链接格式，或者无法识别出条目类型
    #[error("无效的链接: {0}")]
    InvalidUrl(String),

    /// 获取平台页面或搜索接口失败（网络错误或非 2xx 状态码）
    #[error("页面获取失败: {0}")]
    FetchFailed(String),

    /// 响应结构无法解析
    #[error("响应解析失败: {0}")]
    ParseFailed(String),

    /// 提供商链中的所有提供商都失败了
    #[error("平台 `{0}` 的所有提供商均失败")]
    ProviderExhausted(String),

    /// 按名称查找提供商失败
    #[error("未找到提供商: '{0}'")]
    ProviderNotFound(String),

    /// 后端返回了错误，或没有返回可用的媒体
    #[error("API 返回了错误或空数据: {0}")]
    ApiError(String),

    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// 加密失败
    #[error("加密失败: {0}")]
    Encryption(String),
}

/// `DlKitError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, DlKitError>;
