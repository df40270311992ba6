//! 长视频页面的规范记录构建。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{FieldBag, fill, merge_bags};
use crate::extractor::{PageExtract, ValueExt, date_part, parse_duration};
use crate::model::VideoRecord;

static VIDEO_URL_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?v=|embed/|v/|shorts/)|youtu\.be/)([a-zA-Z0-9_-]{11})")
            .expect("编译视频链接正则失败"),
        Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/live/([a-zA-Z0-9_-]+)")
            .expect("编译直播链接正则失败"),
        Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/(?:c|channel|user)/[a-zA-Z0-9_-]+")
            .expect("编译频道链接正则失败"),
    ]
});
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/(?:watch\?v=|embed/|v/|shorts/|live/)|youtu\.be/)([a-zA-Z0-9_-]{11})")
            .expect("编译视频 ID 正则失败"),
        Regex::new(r"[?&]v=([a-zA-Z0-9_-]{11})").expect("编译查询参数 ID 正则失败"),
        Regex::new(r"^([a-zA-Z0-9_-]{11})$").expect("编译裸 ID 正则失败"),
    ]
});

/// 是否为受支持的视频、直播或频道链接。
pub fn is_video_url(url: &str) -> bool {
    let url = url.trim();
    VIDEO_URL_PATTERNS.iter().any(|re| re.is_match(url))
}

/// 取出 11 位视频 ID。频道链接没有 ID。
pub fn video_id(url: &str) -> Option<String> {
    let url = url.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// 由视频 ID 拼出规范观看地址。
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// 单个来源提取出的视频字段。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFields {
    /// 标题。
    pub title: String,
    /// 频道名称。
    pub author: String,
    /// 缩略图。
    pub thumbnail: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 上传日期。
    pub upload_date: String,
}

impl FieldBag for VideoFields {
    fn absorb(&mut self, later: Self) {
        fill(&mut self.title, later.title);
        fill(&mut self.author, later.author);
        fill(&mut self.thumbnail, later.thumbnail);
        fill(&mut self.duration, later.duration);
        fill(&mut self.upload_date, later.upload_date);
    }
}

fn video_object_fields(block: &Value) -> VideoFields {
    VideoFields {
        title: block.str_at(&["name"]).unwrap_or_default().to_string(),
        author: block.get("author").map(Value::joined_names).unwrap_or_default(),
        thumbnail: block
            .get("thumbnailUrl")
            .and_then(Value::first_str)
            .or_else(|| block.get("thumbnail").and_then(Value::first_str))
            .unwrap_or_default()
            .to_string(),
        duration: block
            .str_at(&["duration"])
            .map(parse_duration)
            .unwrap_or_default(),
        upload_date: block
            .str_at(&["uploadDate"])
            .or_else(|| block.str_at(&["datePublished"]))
            .map(date_part)
            .unwrap_or_default(),
    }
}

/// `VideoObject` 结构化数据块。
pub fn fields_from_structured(page: &PageExtract) -> VideoFields {
    merge_bags(page.structured_of_type("VideoObject").map(video_object_fields))
}

/// `og:*` 与 `itemprop` 标签。
pub fn fields_from_meta(page: &PageExtract) -> VideoFields {
    let page_title = page
        .title
        .as_deref()
        .map(|t| t.trim_end_matches(" - YouTube").trim());

    VideoFields {
        title: page
            .meta_any(&["og:title", "title", "name"])
            .or(page_title)
            .unwrap_or_default()
            .to_string(),
        author: page.meta("link:name").unwrap_or_default().to_string(),
        thumbnail: page
            .meta_any(&["og:image", "twitter:image"])
            .unwrap_or_default()
            .to_string(),
        duration: page.meta("duration").map(parse_duration).unwrap_or_default(),
        upload_date: page
            .meta_any(&["uploadDate", "datePublished"])
            .map(date_part)
            .unwrap_or_default(),
    }
}

/// 合并页面来源，得到视频的规范记录。
pub fn build_video_record(id: &str, page: &PageExtract) -> VideoRecord {
    let fields = merge_bags([fields_from_structured(page), fields_from_meta(page)]);
    VideoRecord {
        id: id.to_string(),
        url: watch_url(id),
        title: fields.title,
        author: fields.author,
        thumbnail: fields.thumbnail,
        duration: fields.duration,
        upload_date: fields.upload_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_page;

    #[test]
    fn test_video_url_patterns() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/live/jfKfPfyJRdk",
            "https://www.youtube.com/channel/UC_x5XG1OV2P6uZZ5FSM9Ttw",
        ] {
            assert!(is_video_url(url), "{url} 应被接受");
        }
        assert!(!is_video_url("https://vimeo.com/123"));
        assert!(!is_video_url("https://www.youtube.com/watch?v=short"));
    }

    #[test]
    fn test_video_id() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ?t=10").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://www.youtube.com/channel/UC_x5XG1OV2P6uZZ5FSM9Ttw"),
            None
        );
    }

    #[test]
    fn test_build_video_record_from_itemprops() {
        let html = r#"<html><head><title>Some Video - YouTube</title>
<meta property="og:image" content="https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg">
<meta itemprop="duration" content="PT3M33S">
<meta itemprop="uploadDate" content="2009-10-24T23:57:33-07:00">
<span itemprop="author"><link itemprop="name" content="Rick Astley"></span>
</head></html>"#;

        let page = extract_page(html, &[]);
        let record = build_video_record("dQw4w9WgXcQ", &page);

        assert_eq!(record.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(record.title, "Some Video");
        assert_eq!(record.author, "Rick Astley");
        assert_eq!(record.duration, 213);
        assert_eq!(record.upload_date, "2009-10-24");
    }
}
