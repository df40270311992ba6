//! savepin.app 后端。该后端返回一个 HTML 结果页，直链需要从表格中解析。

use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::error::{DlKitError, Result};
use crate::model::{MediaKind, MediaSource, PinStreamResult, index_sources};
use crate::providers::{BROWSER_USER_AGENT, Provider, ensure_success};

const BASE_URL: &str = "https://www.savepin.app";

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("编译 h1 选择器失败"));
static THUMBNAIL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".image-container img").expect("编译缩略图选择器失败")
});
static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("编译表格行选择器失败"));
static QUALITY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".video-quality").expect("编译画质选择器失败"));
static FORMAT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td:nth-child(2)").expect("编译格式选择器失败"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("编译链接选择器失败"));

/// savepin 提供商。
#[derive(Debug, Clone)]
pub struct SavePin {
    http_client: Client,
}

impl SavePin {
    /// 使用共享的 HTTP 客户端创建实例。
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 取出下载链接中 `url=` 参数的值并做百分号解码；解码失败时返回原始值。
pub(crate) fn direct_url(href: &str) -> String {
    match href.split("url=").nth(1) {
        Some(raw) => urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
        None => href.to_string(),
    }
}

/// 根据表格中的格式列判断媒体类型。
pub(crate) fn classify(format: &str) -> MediaKind {
    let format = format.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| format.contains(n));

    if has(&["mp4", "video"]) {
        MediaKind::Video
    } else if has(&["mp3", "audio"]) {
        MediaKind::Audio
    } else if has(&["jpg", "jpeg", "png", "webp"]) {
        MediaKind::Image
    } else {
        MediaKind::Unknown
    }
}

/// `"720p (HD)"` 只保留括号之前的部分。
pub(crate) fn pure_quality(quality: &str) -> String {
    quality
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn parse_row(row: ElementRef<'_>) -> Option<MediaSource> {
    let quality = row.select(&QUALITY_SELECTOR).next().map(element_text)?;
    let format = row.select(&FORMAT_SELECTOR).next().map(element_text)?;
    let href = row
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .last()?;
    let url = direct_url(href);

    if quality.is_empty() || format.is_empty() || url.trim().is_empty() {
        return None;
    }

    Some(MediaSource::new(url, classify(&format)).with_quality(pure_quality(&quality)))
}

/// 解析结果页。缺少画质、格式或链接的行会被跳过，视频排在图片之前。
pub(crate) fn parse_results(html: &str) -> PinStreamResult {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let thumbnail = document
        .select(&THUMBNAIL_SELECTOR)
        .find_map(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    let source = index_sources(document.select(&ROW_SELECTOR).filter_map(parse_row).collect());

    PinStreamResult {
        title,
        thumbnail,
        source,
    }
}

#[async_trait]
impl Provider<PinStreamResult> for SavePin {
    fn name(&self) -> &'static str {
        "savepin"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    #[instrument(skip(self))]
    async fn stream(&self, url: &str) -> Result<PinStreamResult> {
        if url.trim().is_empty() {
            return Err(DlKitError::EmptyInput("savepin: 链接不能为空".to_string()));
        }

        let response = self
            .http_client
            .get(format!("{BASE_URL}/download.php"))
            .query(&[("url", url), ("lang", "en"), ("type", "redirect")])
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(REFERER, format!("{BASE_URL}/"))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;
        let body = ensure_success("savepin", response).await?.text().await?;
        debug!("[SavePin] 结果页长度 {} 字节", body.len());

        Ok(parse_results(&body))
    }
}
