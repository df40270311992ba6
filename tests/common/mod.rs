//! 集成测试共用的内存抓取器与模拟提供商。

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dlkit_rs::error::{DlKitError, Result};
use dlkit_rs::fetch::{FetchedPage, PageFetcher};
use dlkit_rs::providers::Provider;

pub fn load_test_data(filename: &str) -> String {
    let path = Path::new("tests/test_data").join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("读取测试文件 '{:?}' 失败: {}", path, e))
}

pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dlkit_rs=debug"));
    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// 按 URL 返回预置页面的抓取器。未登记的 URL 一律返回 `FetchFailed`。
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        self.with_redirect(url, url, body)
    }

    /// 请求 `url` 时返回 `final_url` 作为重定向后的地址。
    pub fn with_redirect(mut self, url: &str, final_url: &str, body: impl Into<String>) -> Self {
        self.pages
            .insert(url.to_string(), FetchedPage::new(final_url, body));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| DlKitError::FetchFailed(format!("{url}: 模拟网络错误")))
    }
}

/// 按请求 URL 返回预置结果的提供商；设置了 `fallback` 时，未登记的 URL 返回它。
pub struct MockProvider<T> {
    name: &'static str,
    by_url: HashMap<String, T>,
    fallback: Option<T>,
    calls: Arc<AtomicUsize>,
}

impl<T> MockProvider<T> {
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            by_url: HashMap::new(),
            fallback: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always(name: &'static str, result: T) -> Self {
        Self {
            fallback: Some(result),
            ..Self::failing(name)
        }
    }

    pub fn answer(mut self, url: &str, result: T) -> Self {
        self.by_url.insert(url.to_string(), result);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Provider<T> for MockProvider<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn base_url(&self) -> &'static str {
        "https://mock.invalid"
    }

    async fn stream(&self, url: &str) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.by_url
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| DlKitError::ApiError(format!("{}: 模拟失败 {url}", self.name)))
    }
}

pub fn calls_of(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
