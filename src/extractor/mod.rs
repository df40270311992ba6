//! 字段提取器。
//!
//! 把原始 HTML 拆成三类结构化来源：`<meta>` 标签、`application/ld+json` 结构化数据块、
//! 以及按 `id` 标识的内嵌状态脚本（服务端渲染时写入页面的 JSON）。
//!
//! 提取是纯函数，不做任何 I/O。单个数据块解析失败只记录日志并跳过，
//! 完全提取不到内容时返回空的 `PageExtract`，而不是错误。

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

pub mod text;
pub mod value;

pub use text::{
    DescriptionFields, date_part, extract_release_date, normalise_post_date,
    parse_meta_description, parse_duration,
};
pub use value::ValueExt;

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("编译 META_SELECTOR 失败"));
static LINK_ITEMPROP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[itemprop][content]").expect("编译 LINK_ITEMPROP_SELECTOR 失败")
});
static LD_JSON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("编译 LD_JSON_SELECTOR 失败")
});
static STATE_SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[id]").expect("编译 STATE_SCRIPT_SELECTOR 失败"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("编译 TITLE_SELECTOR 失败"));

/// 一个页面中提取出的全部原始结构。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExtract {
    /// `<meta>` 标签，键为 `property`、`name` 或 `itemprop` 属性值。
    /// `<link itemprop=X content=Y>` 以 `link:X` 为键。同名键只保留第一次出现的值。
    pub meta: HashMap<String, String>,
    /// 全部 ld+json 数据块。数组形式与 `@graph` 会被展开为独立对象。
    pub structured: Vec<Value>,
    /// 内嵌状态脚本，顺序与调用时给出的 `state_ids` 一致。
    pub state: Vec<Value>,
    /// `<title>` 文本。
    pub title: Option<String>,
}

impl PageExtract {
    /// 读取一个非空的 meta 值。
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// 按顺序返回第一个存在的 meta 值。
    pub fn meta_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.meta(key))
    }

    /// `@type` 等于 `kind` 的结构化数据块。`@type` 为数组时只要包含即可。
    pub fn structured_of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Value> {
        self.structured.iter().filter(move |block| {
            block
                .get("@type")
                .map(|t| t.items().iter().any(|v| v.as_str() == Some(kind)))
                .unwrap_or(false)
        })
    }

    /// 没有提取到任何内容。
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.structured.is_empty() && self.state.is_empty()
    }
}

/// 解析 HTML 并提取其中的结构化来源。
///
/// # 参数
/// * `html` - 页面原文。
/// * `state_ids` - 需要读取的内嵌状态脚本 `id`，按给定顺序尝试。
pub fn extract_page(html: &str, state_ids: &[&str]) -> PageExtract {
    let document = Html::parse_document(html);
    let mut extract = PageExtract::default();

    for element in document.select(&META_SELECTOR) {
        let attrs = element.value();
        let Some(content) = attrs.attr("content") else {
            continue;
        };
        let key = attrs
            .attr("property")
            .or_else(|| attrs.attr("name"))
            .or_else(|| attrs.attr("itemprop"));
        if let Some(key) = key {
            extract
                .meta
                .entry(key.to_string())
                .or_insert_with(|| content.to_string());
        }
    }

    for element in document.select(&LINK_ITEMPROP_SELECTOR) {
        let attrs = element.value();
        if let (Some(prop), Some(content)) = (attrs.attr("itemprop"), attrs.attr("content")) {
            extract
                .meta
                .entry(format!("link:{prop}"))
                .or_insert_with(|| content.to_string());
        }
    }

    for (position, element) in document.select(&LD_JSON_SELECTOR).enumerate() {
        let raw: String = element.text().collect();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => flatten_structured(value, &mut extract.structured),
            Err(e) => warn!("[Extractor] 第 {} 个 ld+json 数据块解析失败，已跳过: {}", position, e),
        }
    }

    if !state_ids.is_empty() {
        let mut scripts: HashMap<&str, String> = HashMap::new();
        for element in document.select(&STATE_SCRIPT_SELECTOR) {
            if let Some(id) = element.value().attr("id") {
                if state_ids.contains(&id) && !scripts.contains_key(id) {
                    scripts.insert(id, element.text().collect());
                }
            }
        }

        for id in state_ids {
            let Some(raw) = scripts.get(id) else {
                continue;
            };
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => extract.state.push(value),
                Err(e) => debug!("[Extractor] 状态脚本 '{}' 不是合法 JSON，已跳过: {}", id, e),
            }
        }
    }

    extract.title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    extract
}

fn flatten_structured(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(list) => {
            for item in list {
                flatten_structured(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_structured(graph, out);
            }
            if !map.is_empty() {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}
