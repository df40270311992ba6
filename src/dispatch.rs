//! 提供商调度
//!
//! `ProviderChain` 持有一个平台的全部后端适配器，按固定顺序依次尝试，
//! 第一个给出可用结果的适配器即为胜者。多条目的子解析通过 [`fan_out`] 并发执行，
//! 结果按输入位置返回，与完成顺序无关。

use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::error::{DlKitError, Result};
use crate::model::{PinRecord, PinStreamResult, PostRecord, PostStreamResult, VideoRecord, VideoStreamResult};
use crate::providers::Provider;

/// 判断一个适配器返回的 `Ok` 结果是否真的可用。
///
/// 不可用的 `Ok` 与适配器错误同等对待。
pub trait Usable {
    /// 结果是否包含可直接访问的内容。
    fn is_usable(&self) -> bool;
}

impl Usable for String {
    fn is_usable(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Usable for PostStreamResult {
    fn is_usable(&self) -> bool {
        !self.source.is_empty()
    }
}

impl Usable for PinStreamResult {
    fn is_usable(&self) -> bool {
        !self.source.is_empty()
    }
}

impl Usable for VideoStreamResult {
    fn is_usable(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// 用已经构建好的规范记录补齐胜出结果中仍为空的字段。
pub trait Backfill<R> {
    /// 只写入空字段，不覆盖适配器自己给出的值。
    fn backfill(&mut self, record: &R);
}

fn fill_empty(slot: &mut String, value: &str) {
    if slot.trim().is_empty() && !value.trim().is_empty() {
        *slot = value.to_string();
    }
}

impl Backfill<PostRecord> for PostStreamResult {
    fn backfill(&mut self, record: &PostRecord) {
        fill_empty(&mut self.caption, &record.caption);
        fill_empty(&mut self.username, &record.username);
    }
}

impl Backfill<PinRecord> for PinStreamResult {
    fn backfill(&mut self, record: &PinRecord) {
        fill_empty(&mut self.title, &record.title);
        fill_empty(&mut self.thumbnail, &record.image);
    }
}

impl Backfill<VideoRecord> for VideoStreamResult {
    fn backfill(&mut self, record: &VideoRecord) {
        fill_empty(&mut self.caption, &record.title);
        fill_empty(&mut self.thumbnail, &record.thumbnail);
        if self.duration == 0 {
            self.duration = record.duration;
        }
    }
}

/// 一个平台的有序适配器链。
pub struct ProviderChain<T> {
    platform: &'static str,
    providers: Vec<Box<dyn Provider<T>>>,
}

impl<T: Send> std::fmt::Debug for ProviderChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("platform", &self.platform)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: Usable + Send> ProviderChain<T> {
    /// 以给定顺序创建适配器链。
    pub fn new(platform: &'static str, providers: Vec<Box<dyn Provider<T>>>) -> Self {
        Self { platform, providers }
    }

    /// 平台名称，用于日志与错误信息。
    pub fn platform(&self) -> &'static str {
        self.platform
    }

    /// 按链中顺序列出适配器名称。
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    ///
    /// 按名称取出单个适配器，绕过链的顺序。
    ///
    /// 名称会先去掉首尾空白，再与适配器声明的名称做大小写不敏感的比较。
    ///
    /// # 返回
    /// 名称为空或没有匹配的适配器时返回 `ProviderNotFound`。
    ///
    pub fn provider(&self, name: &str) -> Result<&dyn Provider<T>> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Err(DlKitError::ProviderNotFound(
                "提供商名称不能为空".to_string(),
            ));
        }

        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .map(|p| p.as_ref())
            .ok_or_else(|| {
                DlKitError::ProviderNotFound(format!(
                    "平台 '{}' 没有名为 '{}' 的提供商",
                    self.platform, wanted
                ))
            })
    }

    /// 依次尝试每个适配器，返回第一个可用结果。
    pub async fn stream(&self, url: &str) -> Result<T> {
        let mut failures: Vec<String> = Vec::new();

        for provider in &self.providers {
            debug!(
                "[Dispatch] 平台 '{}' 正在尝试提供商 '{}'",
                self.platform,
                provider.name()
            );
            match provider.stream(url).await {
                Ok(result) if result.is_usable() => {
                    info!(
                        "[Dispatch] 平台 '{}' 的提供商 '{}' 解析成功。",
                        self.platform,
                        provider.name()
                    );
                    return Ok(result);
                }
                Ok(_) => {
                    warn!(
                        "[Dispatch] 平台 '{}' 的提供商 '{}' 返回了空结果",
                        self.platform,
                        provider.name()
                    );
                    failures.push(format!("{}: 空结果", provider.name()));
                }
                Err(e) => {
                    warn!(
                        "[Dispatch] 平台 '{}' 的提供商 '{}' 失败: {}",
                        self.platform,
                        provider.name(),
                        e
                    );
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        error!(
            "[Dispatch] 平台 '{}' 的所有提供商均失败: [{}]",
            self.platform,
            failures.join("; ")
        );
        Err(DlKitError::ProviderExhausted(self.platform().to_string()))
    }

    /// 与 [`stream`](Self::stream) 相同，但会用规范记录补齐胜出结果中的空字段。
    pub async fn stream_backfilled<R>(&self, url: &str, record: &R) -> Result<T>
    where
        T: Backfill<R>,
        R: Sync,
    {
        let mut result = self.stream(url).await?;
        result.backfill(record);
        Ok(result)
    }
}

///
/// 并发执行一组子任务，并按输入顺序返回全部结果。
///
/// 所有子任务都完成之后才返回。`limit` 为同时在途的任务数上限，最小为 1。
///
pub async fn fan_out<I, F, Fut>(items: I, limit: usize, task: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(items)
        .map(task)
        .buffered(limit.max(1))
        .collect()
        .await
}
