//! 图钉页面的规范记录构建。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{FieldBag, fill, merge_bags};
use crate::extractor::{PageExtract, ValueExt, date_part};
use crate::model::PinRecord;

static PIN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[a-z0-9-]+\.)?pinterest\.[a-z]{2,3}(?:\.[a-z]{2})?/pin/[A-Za-z0-9_-]+")
        .expect("编译 PIN_URL_REGEX 失败")
});
static SHORT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://pin\.it/[A-Za-z0-9_-]+").expect("编译 SHORT_LINK_REGEX 失败")
});
static PIN_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/pin/(?:[^/?#]*--)?([A-Za-z0-9_-]+)").expect("编译 PIN_ID_REGEX 失败")
});

/// 是否为图钉链接或 `pin.it` 短链接。
pub fn is_pin_url(url: &str) -> bool {
    let url = url.trim();
    PIN_URL_REGEX.is_match(url) || SHORT_LINK_REGEX.is_match(url)
}

/// 从 URL 中取出图钉 ID。短链接需要先跟随重定向。
pub fn pin_id(url: &str) -> Option<String> {
    PIN_ID_REGEX.captures(url).map(|caps| caps[1].to_string())
}

/// 单个来源提取出的图钉字段。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinFields {
    /// 标题。
    pub title: String,
    /// 描述。
    pub description: String,
    /// 图片。
    pub image: String,
    /// 作者。
    pub author: String,
    /// 发布日期。
    pub date: String,
}

impl FieldBag for PinFields {
    fn absorb(&mut self, later: Self) {
        fill(&mut self.title, later.title);
        fill(&mut self.description, later.description);
        fill(&mut self.image, later.image);
        fill(&mut self.author, later.author);
        fill(&mut self.date, later.date);
    }
}

fn block_fields(block: &Value) -> PinFields {
    PinFields {
        title: block
            .str_at(&["headline"])
            .or_else(|| block.str_at(&["name"]))
            .unwrap_or_default()
            .to_string(),
        description: block
            .str_at(&["description"])
            .or_else(|| block.str_at(&["articleBody"]))
            .unwrap_or_default()
            .to_string(),
        image: block
            .get("image")
            .and_then(Value::first_str)
            .or_else(|| block.get("contentUrl").and_then(Value::first_str))
            .or_else(|| block.get("thumbnailUrl").and_then(Value::first_str))
            .unwrap_or_default()
            .to_string(),
        author: block.get("author").map(Value::joined_names).unwrap_or_default(),
        date: block
            .str_at(&["datePublished"])
            .or_else(|| block.str_at(&["uploadDate"]))
            .or_else(|| block.str_at(&["dateCreated"]))
            .map(date_part)
            .unwrap_or_default(),
    }
}

/// 页面上的全部结构化数据块。
pub fn fields_from_structured(page: &PageExtract) -> PinFields {
    merge_bags(page.structured.iter().map(block_fields))
}

/// `og:*` 与通用 meta 标签，最后用 `<title>` 兜底标题。
pub fn fields_from_meta(page: &PageExtract) -> PinFields {
    PinFields {
        title: page
            .meta_any(&["og:title", "twitter:title"])
            .or(page.title.as_deref())
            .unwrap_or_default()
            .to_string(),
        description: page
            .meta_any(&["og:description", "description"])
            .unwrap_or_default()
            .to_string(),
        image: page
            .meta_any(&["og:image", "twitter:image"])
            .unwrap_or_default()
            .to_string(),
        author: page.meta("author").unwrap_or_default().to_string(),
        date: page
            .meta("article:published_time")
            .map(date_part)
            .unwrap_or_default(),
    }
}

/// 合并页面来源，得到图钉的规范记录。
pub fn build_pin_record(requested_url: &str, final_url: &str, page: &PageExtract) -> PinRecord {
    let fields = merge_bags([fields_from_structured(page), fields_from_meta(page)]);
    PinRecord {
        id: pin_id(final_url)
            .or_else(|| pin_id(requested_url))
            .unwrap_or_default(),
        url: final_url.to_string(),
        title: fields.title,
        description: fields.description,
        image: fields.image,
        author: fields.author,
        date: fields.date,
    }
}
