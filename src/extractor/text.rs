//! 针对纯文本字段的解析：ISO-8601 时长、发行日期和 `og:description` 描述文本。

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static RELEASE_DATE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"Released (\d{4}-\d{2}-\d{2})").expect("编译 Released 日期正则失败"),
        Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("编译完整日期正则失败"),
        Regex::new(r"(\d{4})").expect("编译年份正则失败"),
    ]
});

static LIKES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9Kk\.,]+) likes").expect("编译 LIKES_REGEX 失败"));
static COMMENTS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*([0-9Kk\.,]+)\s*comments").expect("编译 COMMENTS_REGEX 失败")
});
static USER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*(.*?)\s*on").expect("编译 USER_REGEX 失败"));
static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"on\s(.*?):").expect("编译 DATE_REGEX 失败"));
static CAPTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#":\s*"(.*)""#).expect("编译 CAPTION_REGEX 失败"));

/// 解析 `PT#H#M#S` 形式的时长，返回整秒数。
///
/// 各分量都可以缺省，小数秒向下截断。无法解析时返回 0。
pub fn parse_duration(token: &str) -> u64 {
    let Some(mut rest) = token.trim().strip_prefix("PT") else {
        return 0;
    };

    let mut total = 0.0_f64;
    for (unit, factor) in [('H', 3600.0), ('M', 60.0), ('S', 1.0)] {
        if let Some(pos) = rest.find(unit) {
            let amount = rest[..pos].trim().parse::<f64>().unwrap_or(0.0);
            if amount.is_finite() && amount > 0.0 {
                total += amount * factor;
            }
            rest = &rest[pos + 1..];
        }
    }

    if total.is_finite() { total as u64 } else { 0 }
}

/// 从一段描述文本中按固定顺序提取发行日期。
pub fn extract_release_date(description: &str) -> Option<String> {
    RELEASE_DATE_PATTERNS.iter().find_map(|re| {
        re.captures(description)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// 丢弃 ISO 时间戳中的时间部分，只保留日期。
pub fn date_part(timestamp: &str) -> String {
    timestamp
        .split('T')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 从 `og:description` 中解析出的子字段。未匹配的字段为空字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionFields {
    /// 点赞数，保持原文（如 `1,234` 或 `12K`）。
    pub likes: String,
    /// 评论数，保持原文。
    pub comments: String,
    /// 作者用户名。
    pub username: String,
    /// 发布日期原文。
    pub date: String,
    /// 正文。
    pub caption: String,
}

/// 依次应用点赞、评论、作者、日期、正文的正则解析描述文本。
///
/// 正文正则不匹配时，退化为按第一个冒号切分并去掉两端的空白和引号。
pub fn parse_meta_description(text: &str) -> DescriptionFields {
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    let mut fields = DescriptionFields {
        likes: capture(&LIKES_REGEX),
        comments: capture(&COMMENTS_REGEX),
        username: capture(&USER_REGEX),
        date: capture(&DATE_REGEX),
        caption: capture(&CAPTION_REGEX),
    };

    if !CAPTION_REGEX.is_match(text) {
        if let Some((_, tail)) = text.split_once(':') {
            fields.caption = tail.trim().trim_matches('"').to_string();
        }
    }

    fields
}

/// 把 `March 3, 2024` 之类的日期规范为 `2024-03-03`，无法识别时原样返回。
pub fn normalise_post_date(raw: &str) -> String {
    let trimmed = raw.trim();
    ["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
