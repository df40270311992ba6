//! 音乐条目的规范记录构建。
//!
//! 来源的合并顺序固定为：主页面 meta 标签、ld+json 结构化数据、内嵌状态脚本、嵌入页。
//! 曲目列表只由一个来源提供，即第一个给出带名称曲目的来源。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{FieldBag, fill};
use crate::extractor::{
    PageExtract, ValueExt, date_part, extract_release_date, parse_duration,
};
use crate::model::{AudioRecord, ItemKind, TrackInfo};

/// 主页面上需要读取的内嵌状态脚本。
pub const PRIMARY_STATE_IDS: &[&str] = &["__NEXT_DATA__"];
/// 嵌入页上需要读取的内嵌状态脚本，按顺序尝试。
pub const EMBED_STATE_IDS: &[&str] = &["amino-initial-data", "__NEXT_DATA__"];

const TRACK_URL_PREFIX: &str = "https://open.spotify.com/track/";

static ITEM_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(track|album|playlist)/([a-zA-Z0-9]+)").expect("编译 ITEM_PATH_REGEX 失败")
});
static ITEM_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^spotify:(track|album|playlist):([a-zA-Z0-9]+)$").expect("编译 ITEM_URI_REGEX 失败")
});

/// 把 `spotify:<type>:<id>` 形式的 URI 转换为网页地址，其他输入只去除首尾空白。
pub fn normalise_input(input: &str) -> String {
    let trimmed = input.trim();
    match ITEM_URI_REGEX.captures(trimmed) {
        Some(caps) => format!("https://open.spotify.com/{}/{}", &caps[1], &caps[2]),
        None => trimmed.to_string(),
    }
}

/// 从最终 URL 推断条目类型与 ID。匹配不到时返回 `(Unknown, "")`。
pub fn infer_item(url: &str) -> (ItemKind, String) {
    ITEM_PATH_REGEX
        .captures(url)
        .map(|caps| (ItemKind::from_segment(&caps[1]), caps[2].to_string()))
        .unwrap_or((ItemKind::Unknown, String::new()))
}

/// 在条目类型路径段之前插入 `/embed`，得到嵌入页地址。
pub fn embed_url(url: &str) -> Option<String> {
    ["/playlist/", "/album/", "/track/"]
        .iter()
        .find(|segment| url.contains(*segment))
        .map(|segment| url.replacen(segment, &format!("/embed{segment}"), 1))
}

/// `spotify:track:<id>` 转换为曲目页面地址。
pub fn track_url_from_uri(uri: &str) -> Option<String> {
    let (_, id) = uri.rsplit_once(':')?;
    let id = id.trim();
    (!id.is_empty()).then(|| format!("{TRACK_URL_PREFIX}{id}"))
}

/// 单个来源提取出的音乐字段。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioFields {
    /// 名称。
    pub name: String,
    /// 艺术家。
    pub artist: String,
    /// 封面。
    pub image: String,
    /// 试听地址。
    pub preview_url: String,
    /// 时长（秒）。
    pub duration: u64,
    /// 发行日期。
    pub release_date: String,
    /// 曲目列表。
    pub tracks: Vec<TrackInfo>,
}

impl FieldBag for AudioFields {
    fn absorb(&mut self, later: Self) {
        fill(&mut self.name, later.name);
        fill(&mut self.artist, later.artist);
        fill(&mut self.image, later.image);
        fill(&mut self.preview_url, later.preview_url);
        fill(&mut self.duration, later.duration);
        fill(&mut self.release_date, later.release_date);
        if self.tracks.is_empty() && later.tracks.iter().any(|t| !t.name.is_empty()) {
            self.tracks = later.tracks;
        }
    }
}

/// 主页面的 meta 标签。
pub fn fields_from_meta(page: &PageExtract) -> AudioFields {
    AudioFields {
        image: page.meta("og:image").unwrap_or_default().to_string(),
        duration: page
            .meta("music:duration")
            .and_then(|d| d.parse::<u64>().ok())
            .unwrap_or_default(),
        release_date: page
            .meta("music:release_date")
            .map(date_part)
            .unwrap_or_default(),
        ..Default::default()
    }
}

/// ld+json 结构化数据块。
///
/// `MusicRecording` 只对单曲（或类型未知的条目）生效，
/// `MusicAlbum` 与 `MusicPlaylist` 只在条目类型一致时生效。
pub fn fields_from_structured(page: &PageExtract, kind: ItemKind, page_url: &str) -> AudioFields {
    let mut merged = AudioFields::default();
    for block in &page.structured {
        let bag = match block.str_at(&["@type"]) {
            Some("MusicRecording") if matches!(kind, ItemKind::Track | ItemKind::Unknown) => {
                recording_fields(block, kind, page_url)
            }
            Some("MusicAlbum") if kind == ItemKind::Album => collection_fields(block),
            Some("MusicPlaylist") if kind == ItemKind::Playlist => collection_fields(block),
            _ => continue,
        };
        merged.absorb(bag);
    }
    merged
}

/// 内嵌状态脚本（主页面或嵌入页）。
pub fn fields_from_state(page: &PageExtract, kind: ItemKind) -> AudioFields {
    let mut merged = AudioFields::default();
    for blob in &page.state {
        if let Some(entity) = locate_entity(blob) {
            merged.absorb(entity_fields(entity, kind));
        }
    }
    merged
}

fn recording_fields(block: &Value, kind: ItemKind, page_url: &str) -> AudioFields {
    let name = block.str_at(&["name"]).unwrap_or_default().to_string();
    let artist = block.get("byArtist").map(Value::joined_names).unwrap_or_default();
    let image = block
        .get("image")
        .and_then(Value::first_str)
        .unwrap_or_default()
        .to_string();
    let preview_url = block
        .str_at(&["audio", "contentUrl"])
        .unwrap_or_default()
        .to_string();
    let duration = block
        .str_at(&["audio", "duration"])
        .or_else(|| block.str_at(&["duration"]))
        .map(parse_duration)
        .unwrap_or_default();
    let release_date = block
        .str_at(&["description"])
        .and_then(extract_release_date)
        .or_else(|| block.str_at(&["datePublished"]).map(date_part))
        .unwrap_or_default();

    let tracks = if kind == ItemKind::Track && !name.is_empty() {
        vec![TrackInfo {
            name: name.clone(),
            artist: artist.clone(),
            preview_url: preview_url.clone(),
            url: page_url.to_string(),
            duration,
            release_date: release_date.clone(),
            image: image.clone(),
        }]
    } else {
        Vec::new()
    };

    AudioFields {
        name,
        artist,
        image,
        preview_url,
        duration,
        release_date,
        tracks,
    }
}

fn collection_fields(block: &Value) -> AudioFields {
    let release_date = block
        .str_at(&["releaseOf", "datePublished"])
        .or_else(|| block.str_at(&["datePublished"]))
        .map(date_part)
        .unwrap_or_default();

    let tracks = block
        .get("track")
        .map(|track| {
            track
                .items()
                .into_iter()
                .flat_map(|entry| match entry.get("itemListElement") {
                    Some(list) => list
                        .items()
                        .into_iter()
                        .map(|element| element.get("item").unwrap_or(element))
                        .collect::<Vec<_>>(),
                    None => vec![entry],
                })
                .filter_map(structured_track)
                .collect()
        })
        .unwrap_or_default();

    AudioFields {
        name: block.str_at(&["name"]).unwrap_or_default().to_string(),
        artist: block.get("byArtist").map(Value::joined_names).unwrap_or_default(),
        image: block
            .get("image")
            .and_then(Value::first_str)
            .unwrap_or_default()
            .to_string(),
        release_date,
        tracks,
        ..Default::default()
    }
}

fn structured_track(item: &Value) -> Option<TrackInfo> {
    let name = item.str_at(&["name"])?;
    Some(TrackInfo {
        name: name.to_string(),
        artist: item.get("byArtist").map(Value::joined_names).unwrap_or_default(),
        preview_url: item
            .str_at(&["audio", "contentUrl"])
            .or_else(|| item.str_at(&["previewUrl"]))
            .unwrap_or_default()
            .to_string(),
        url: item.str_at(&["url"]).unwrap_or_default().to_string(),
        duration: item
            .str_at(&["audio", "duration"])
            .or_else(|| item.str_at(&["duration"]))
            .map(parse_duration)
            .unwrap_or_default(),
        release_date: item
            .str_at(&["datePublished"])
            .map(date_part)
            .unwrap_or_default(),
        image: String::new(),
    })
}

/// 在状态脚本中按固定顺序查找 `entity` 对象。
fn locate_entity(blob: &Value) -> Option<&Value> {
    const ENTITY_PATHS: [&[&str]; 3] = [
        &["props", "pageProps", "state", "data", "entity"],
        &["data", "entity"],
        &["props", "data", "entity"],
    ];
    ENTITY_PATHS
        .iter()
        .filter_map(|path| blob.at(path))
        .find(|v| v.is_object())
}

fn entity_release_date(entity: &Value) -> String {
    entity
        .str_at(&["releaseDate", "isoString"])
        .or_else(|| entity.str_at(&["releaseDate"]))
        .map(date_part)
        .unwrap_or_default()
}

fn entity_duration(entity: &Value) -> u64 {
    entity
        .u64_at(&["duration"])
        .or_else(|| entity.u64_at(&["duration", "totalMilliseconds"]))
        .map(|ms| ms / 1000)
        .unwrap_or_default()
}

fn entity_fields(entity: &Value, kind: ItemKind) -> AudioFields {
    let mut fields = AudioFields {
        name: entity
            .str_at(&["name"])
            .or_else(|| entity.str_at(&["title"]))
            .unwrap_or_default()
            .to_string(),
        image: entity
            .str_at(&["images", "0", "url"])
            .or_else(|| entity.str_at(&["coverArt", "sources", "0", "url"]))
            .unwrap_or_default()
            .to_string(),
        release_date: entity_release_date(entity),
        ..Default::default()
    };

    match kind {
        ItemKind::Track => {
            let artists = entity.get("artists").map(Value::joined_names).unwrap_or_default();
            fields.artist = if artists.is_empty() {
                entity.str_at(&["subtitle"]).unwrap_or_default().to_string()
            } else {
                artists
            };
            fields.preview_url = entity
                .str_at(&["audioPreview", "url"])
                .unwrap_or_default()
                .to_string();
            fields.duration = entity_duration(entity);
            fill(
                &mut fields.image,
                entity
                    .str_at(&["album", "images", "0", "url"])
                    .unwrap_or_default()
                    .to_string(),
            );

            let track_url = entity.str_at(&["uri"]).and_then(track_url_from_uri);
            if let Some(url) = track_url.filter(|_| !fields.name.is_empty()) {
                fields.tracks.push(TrackInfo {
                    name: fields.name.clone(),
                    artist: fields.artist.clone(),
                    preview_url: fields.preview_url.clone(),
                    url,
                    duration: fields.duration,
                    release_date: fields.release_date.clone(),
                    image: fields.image.clone(),
                });
            }
        }
        ItemKind::Album | ItemKind::Playlist => {
            fields.artist = entity.str_at(&["subtitle"]).unwrap_or_default().to_string();
            fields.tracks = entity
                .get("trackList")
                .map(|list| list.items().into_iter().filter_map(state_track).collect())
                .unwrap_or_default();
        }
        ItemKind::Unknown => {}
    }

    fields
}

fn state_track(item: &Value) -> Option<TrackInfo> {
    let name = item.str_at(&["title"]).or_else(|| item.str_at(&["name"]))?;
    let url = item.str_at(&["uri"]).and_then(track_url_from_uri)?;
    let artist = match item.str_at(&["subtitle"]) {
        Some(subtitle) => subtitle.to_string(),
        None => item.get("artists").map(Value::joined_names).unwrap_or_default(),
    };

    Some(TrackInfo {
        name: name.to_string(),
        artist,
        preview_url: item
            .str_at(&["audioPreview", "url"])
            .unwrap_or_default()
            .to_string(),
        url,
        duration: entity_duration(item),
        ..Default::default()
    })
}

/// 把多个来源合并为一个 `AudioRecord`。
#[derive(Debug, Clone)]
pub struct AudioRecordBuilder {
    kind: ItemKind,
    id: String,
    url: String,
    fields: AudioFields,
}

impl AudioRecordBuilder {
    /// 以跟随重定向后的最终 URL 开始构建。
    pub fn new(final_url: &str) -> Self {
        let (kind, id) = infer_item(final_url);
        Self {
            kind,
            id,
            url: final_url.to_string(),
            fields: AudioFields::default(),
        }
    }

    /// 依次合并主页面的 meta 标签、结构化数据和内嵌状态。
    pub fn absorb_page(&mut self, page: &PageExtract) {
        self.fields.absorb(fields_from_meta(page));
        self.fields
            .absorb(fields_from_structured(page, self.kind, &self.url));
        self.fields.absorb(fields_from_state(page, self.kind));
    }

    /// 主页面之后既没有名称也没有曲目时，需要回退到嵌入页。
    pub fn needs_embed(&self) -> bool {
        self.kind != ItemKind::Unknown
            && self.fields.name.is_empty()
            && self.fields.tracks.is_empty()
    }

    /// 当前条目的嵌入页地址。
    pub fn embed_url(&self) -> Option<String> {
        embed_url(&self.url)
    }

    /// 合并嵌入页的内嵌状态。
    pub fn absorb_embed(&mut self, page: &PageExtract) {
        self.fields.absorb(fields_from_state(page, self.kind));
    }

    /// 结束构建。
    ///
    /// 单曲的曲目条目会用记录本身的字段补齐；专辑曲目继承专辑的封面和发行日期。
    pub fn finish(self) -> AudioRecord {
        let AudioFields {
            mut name,
            mut artist,
            image,
            mut preview_url,
            duration,
            release_date,
            mut tracks,
        } = self.fields;

        if self.kind == ItemKind::Track && name.is_empty() {
            if let Some(first) = tracks.first() {
                name = first.name.clone();
                artist = first.artist.clone();
                preview_url = first.preview_url.clone();
            }
        }

        for track in &mut tracks {
            match self.kind {
                ItemKind::Track => {
                    fill(&mut track.artist, artist.clone());
                    fill(&mut track.image, image.clone());
                    fill(&mut track.preview_url, preview_url.clone());
                    fill(&mut track.duration, duration);
                    fill(&mut track.release_date, release_date.clone());
                }
                ItemKind::Album => {
                    fill(&mut track.image, image.clone());
                    fill(&mut track.release_date, release_date.clone());
                }
                ItemKind::Playlist | ItemKind::Unknown => {}
            }
        }

        AudioRecord {
            kind: self.kind,
            id: self.id,
            url: self.url,
            name,
            artist,
            image,
            preview_url,
            duration,
            release_date,
            tracks,
        }
    }
}

/// 用单曲解析结果补齐合集中的一首曲目，只写入原本为空的字段。
pub fn backfill_track(track: &mut TrackInfo, resolved: &AudioRecord) {
    fill(&mut track.name, resolved.name.clone());
    fill(&mut track.artist, resolved.artist.clone());
    fill(&mut track.image, resolved.image.clone());
    fill(&mut track.preview_url, resolved.preview_url.clone());
    fill(&mut track.duration, resolved.duration);
    fill(&mut track.release_date, resolved.release_date.clone());
}
