//! 短视频帖子的规范记录构建。
//!
//! 结构化数据优先，`og:*` meta 标签作为最后的回退来源。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{FieldBag, fill, merge_bags};
use crate::extractor::{PageExtract, ValueExt, date_part, normalise_post_date, parse_meta_description};
use crate::model::PostRecord;

static POST_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?instagram\.com/(?:p|reel|tv)/[a-zA-Z0-9_-]+")
        .expect("编译 POST_URL_REGEX 失败")
});
static SHORTCODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:p|reels?|tv)/([a-zA-Z0-9_-]+)").expect("编译 SHORTCODE_REGEX 失败")
});

const POSTING_TYPES: &[&str] = &["SocialMediaPosting", "VideoObject", "ImageObject"];

/// 是否为帖子链接（`/p/`、`/reel/` 或 `/tv/`）。
pub fn is_post_url(url: &str) -> bool {
    POST_URL_REGEX.is_match(url.trim())
}

/// 从 URL 路径中取出帖子短码。
pub fn shortcode(url: &str) -> Option<String> {
    SHORTCODE_REGEX
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// 单个来源提取出的帖子字段。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFields {
    /// 作者用户名。
    pub username: String,
    /// 点赞数。
    pub likes: String,
    /// 评论数。
    pub comments: String,
    /// 正文。
    pub caption: String,
    /// 发布日期原文。
    pub date: String,
    /// 缩略图。
    pub thumbnail: String,
}

impl FieldBag for PostFields {
    fn absorb(&mut self, later: Self) {
        fill(&mut self.username, later.username);
        fill(&mut self.likes, later.likes);
        fill(&mut self.comments, later.comments);
        fill(&mut self.caption, later.caption);
        fill(&mut self.date, later.date);
        fill(&mut self.thumbnail, later.thumbnail);
    }
}

/// `SocialMediaPosting` 等结构化数据块。
pub fn fields_from_structured(page: &PageExtract) -> PostFields {
    let bags = POSTING_TYPES
        .iter()
        .flat_map(|kind| page.structured_of_type(kind))
        .map(posting_fields);
    merge_bags(bags)
}

fn posting_fields(block: &Value) -> PostFields {
    let username = block
        .str_at(&["author", "alternateName"])
        .or_else(|| block.str_at(&["author", "identifier", "value"]))
        .or_else(|| block.str_at(&["author", "name"]))
        .unwrap_or_default()
        .trim_start_matches('@')
        .to_string();

    PostFields {
        username,
        caption: block
            .str_at(&["articleBody"])
            .or_else(|| block.str_at(&["caption"]))
            .or_else(|| block.str_at(&["description"]))
            .unwrap_or_default()
            .to_string(),
        date: block
            .str_at(&["dateCreated"])
            .or_else(|| block.str_at(&["datePublished"]))
            .or_else(|| block.str_at(&["uploadDate"]))
            .map(date_part)
            .unwrap_or_default(),
        thumbnail: block
            .get("image")
            .and_then(Value::first_str)
            .or_else(|| block.get("thumbnailUrl").and_then(Value::first_str))
            .unwrap_or_default()
            .to_string(),
        ..Default::default()
    }
}

/// `og:image` 与 `og:description`。
pub fn fields_from_meta(page: &PageExtract) -> PostFields {
    let description = page
        .meta_any(&["og:description", "description"])
        .map(parse_meta_description)
        .unwrap_or_default();

    PostFields {
        username: description.username,
        likes: description.likes,
        comments: description.comments,
        caption: description.caption,
        date: description.date,
        thumbnail: page.meta("og:image").unwrap_or_default().to_string(),
    }
}

/// 合并页面来源，得到帖子的规范记录。
///
/// # 参数
/// * `requested_url` - 调用方传入的原始链接，最终 URL 中取不到短码时用它兜底。
/// * `final_url` - 跟随重定向之后的 URL。
pub fn build_post_record(requested_url: &str, final_url: &str, page: &PageExtract) -> PostRecord {
    let fields = merge_bags([fields_from_structured(page), fields_from_meta(page)]);
    let id = shortcode(final_url)
        .or_else(|| shortcode(requested_url))
        .unwrap_or_default();

    PostRecord {
        id,
        url: final_url.to_string(),
        username: fields.username,
        likes: fields.likes,
        comments: fields.comments,
        caption: fields.caption,
        date: normalise_post_date(&fields.date),
        thumbnail: fields.thumbnail,
    }
}
