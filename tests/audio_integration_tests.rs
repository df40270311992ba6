mod common;

use common::{MockFetcher, MockProvider, calls_of, init_tracing, load_test_data};
use dlkit_rs::config::DlKitConfig;
use dlkit_rs::error::DlKitError;
use dlkit_rs::model::ItemKind;
use dlkit_rs::platforms::AudioService;
use dlkit_rs::providers::Provider;

const TRACK_URL: &str = "https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b";
const ALBUM_URL: &str = "https://open.spotify.com/album/5AlbumFiveSongs";
const PLAYLIST_URL: &str = "https://open.spotify.com/playlist/37i9dQZF1RoadTrip";
const PLAYLIST_EMBED_URL: &str = "https://open.spotify.com/embed/playlist/37i9dQZF1RoadTrip";

fn track_url(id: &str) -> String {
    format!("https://open.spotify.com/track/{id}")
}

/// 一个只带 ld+json 的单曲页面，用于合集曲目的逐首补全。
fn track_page(name: &str, preview: &str) -> String {
    format!(
        r#"<html><head>
<meta property="og:image" content="https://i.scdn.co/image/{name}">
<script type="application/ld+json">{{"@type":"MusicRecording","name":"{name}","byArtist":{{"name":"Test Band"}},"duration":"PT4M","audio":{{"contentUrl":"{preview}"}},"datePublished":"2020-06-12"}}</script>
</head></html>"#
    )
}

fn album_fetcher(failing_track: Option<&str>) -> MockFetcher {
    let mut fetcher = MockFetcher::new().with_page(ALBUM_URL, load_test_data("audio_album_state.html"));
    for (id, name) in [
        ("trk1", "One"),
        ("trk2", "Two"),
        ("trk3", "Three"),
        ("trk4", "Four"),
        ("trk5", "Five"),
    ] {
        if Some(id) == failing_track {
            continue;
        }
        fetcher = fetcher.with_page(
            &track_url(id),
            track_page(name, &format!("https://p.scdn.co/mp3-preview/{id}")),
        );
    }
    fetcher
}

fn service(fetcher: MockFetcher, providers: Vec<Box<dyn Provider<String>>>) -> AudioService {
    AudioService::with_components(fetcher.into_shared(), providers, &DlKitConfig::default())
}

#[tokio::test]
async fn test_ld_json_object_and_array_give_identical_records() {
    init_tracing();

    let object_service = service(
        MockFetcher::new().with_page(TRACK_URL, load_test_data("audio_track_ld_object.html")),
        vec![],
    );
    let array_service = service(
        MockFetcher::new().with_page(TRACK_URL, load_test_data("audio_track_ld_array.html")),
        vec![],
    );

    let from_object = object_service.get_info(TRACK_URL).await.unwrap();
    let from_array = array_service.get_info(TRACK_URL).await.unwrap();

    assert_eq!(from_object, from_array, "两种结构化数据形态应得到相同的记录");
    assert_eq!(from_object.kind, ItemKind::Track);
    assert_eq!(from_object.id, "0VjIjW4GlUZAMYd2vXMi3b");
    assert_eq!(from_object.name, "Blinding Lights");
    assert_eq!(from_object.artist, "The Weeknd");
    assert_eq!(from_object.duration, 200, "小数秒应被截断");
    assert_eq!(from_object.release_date, "2019-11-29");
    assert_eq!(
        from_object.image,
        "https://i.scdn.co/image/ab67616d0000b273blinding"
    );
    assert_eq!(from_object.tracks.len(), 1);
    assert_eq!(from_object.tracks[0].url, TRACK_URL);
}

#[tokio::test]
async fn test_spotify_uri_is_normalised_before_fetching() {
    let fetcher = MockFetcher::new()
        .with_page(TRACK_URL, load_test_data("audio_track_ld_object.html"))
        .into_shared();
    let audio = AudioService::with_components(fetcher.clone(), vec![], &DlKitConfig::default());

    let record = audio
        .get_info("spotify:track:0VjIjW4GlUZAMYd2vXMi3b")
        .await
        .unwrap();

    assert_eq!(record.name, "Blinding Lights");
    assert_eq!(fetcher.calls(), vec![TRACK_URL.to_string()]);
}

#[tokio::test]
async fn test_enrichment_failure_keeps_track_slot() {
    init_tracing();

    let fetcher = album_fetcher(Some("trk3")).into_shared();
    let audio = AudioService::with_components(fetcher.clone(), vec![], &DlKitConfig::default());

    let record = audio.get_info(ALBUM_URL).await.unwrap();

    assert_eq!(record.kind, ItemKind::Album);
    assert_eq!(record.name, "Five Songs");
    let names: Vec<_> = record.tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["One", "Two", "Three", "Four", "Five"], "曲目顺序必须保持不变");

    for (i, track) in record.tracks.iter().enumerate() {
        if i == 2 {
            assert!(track.preview_url.is_empty(), "补全失败的曲目保留原有字段");
            assert_eq!(track.duration, 163);
            assert_eq!(track.image, "https://i.scdn.co/image/album-cover");
        } else {
            assert_eq!(
                track.preview_url,
                format!("https://p.scdn.co/mp3-preview/trk{}", i + 1)
            );
        }
    }

    assert_eq!(
        record.tracks[0].duration, 181,
        "已有的时长不应被单曲页面覆盖"
    );
    assert_eq!(fetcher.calls().len(), 6, "一次专辑页面加五次曲目页面");
}

#[tokio::test]
async fn test_embed_page_fallback() {
    let fetcher = MockFetcher::new()
        .with_page(PLAYLIST_URL, "<html><head><title>Spotify</title></head></html>")
        .with_page(PLAYLIST_EMBED_URL, load_test_data("audio_playlist_embed.html"))
        .into_shared();
    let audio = AudioService::with_components(fetcher.clone(), vec![], &DlKitConfig::default());

    let record = audio.get_info(PLAYLIST_URL).await.unwrap();

    assert_eq!(record.kind, ItemKind::Playlist);
    assert_eq!(record.name, "Road Trip");
    assert_eq!(record.image, "https://image-cdn.spotifycdn.com/roadtrip");
    assert_eq!(record.tracks.len(), 2);
    assert_eq!(record.tracks[0].url, track_url("drv1"));
    assert_eq!(record.tracks[1].duration, 185);
    assert!(
        fetcher.calls().contains(&PLAYLIST_EMBED_URL.to_string()),
        "主页面信息不足时应请求嵌入页"
    );
}

#[tokio::test]
async fn test_missing_embed_page_is_not_an_error() {
    let audio = service(
        MockFetcher::new().with_page(PLAYLIST_URL, "<html></html>"),
        vec![],
    );

    let record = audio.get_info(PLAYLIST_URL).await.unwrap();
    assert_eq!(record.kind, ItemKind::Playlist);
    assert!(record.name.is_empty());
    assert!(record.tracks.is_empty());
}

#[tokio::test]
async fn test_stream_drops_tracks_without_source() {
    init_tracing();

    let mut provider = MockProvider::failing("mock");
    for id in ["trk1", "trk2", "trk4", "trk5"] {
        provider = provider.answer(&track_url(id), format!("https://cdn.example/{id}.mp3"));
    }
    let audio = service(album_fetcher(None), vec![Box::new(provider)]);

    let result = audio.stream(ALBUM_URL).await.unwrap();

    assert_eq!(result.kind, ItemKind::Album);
    assert_eq!(result.id, "5AlbumFiveSongs");
    assert_eq!(result.source.len(), 4, "所有提供商都失败的曲目应被省略");

    let titles: Vec<_> = result.source.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["One", "Two", "Four", "Five"]);
    let indices: Vec<_> = result.source.iter().map(|s| s.source.index).collect();
    assert_eq!(indices, [0, 1, 2, 3], "编号应从 0 开始连续");
    assert_eq!(result.source[2].source.url, "https://cdn.example/trk4.mp3");
}

#[tokio::test]
async fn test_stream_falls_through_provider_chain() {
    let first = MockProvider::<String>::failing("first");
    let second = MockProvider::<String>::failing("second");
    let third = MockProvider::always("third", "https://cdn.example/blinding.mp3".to_string());
    let (c1, c3) = (first.counter(), third.counter());

    let audio = service(
        MockFetcher::new().with_page(TRACK_URL, load_test_data("audio_track_ld_object.html")),
        vec![Box::new(first), Box::new(second), Box::new(third)],
    );

    let result = audio.stream(TRACK_URL).await.unwrap();

    assert_eq!(result.source.len(), 1);
    assert_eq!(result.source[0].source.url, "https://cdn.example/blinding.mp3");
    assert_eq!(result.source[0].title, "Blinding Lights");
    assert_eq!(calls_of(&c1), 1);
    assert_eq!(calls_of(&c3), 1);
}

#[tokio::test]
async fn test_stream_rejects_unknown_item_type() {
    let artist_url = "https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF";
    let provider = MockProvider::always("mock", "https://cdn.example/x.mp3".to_string());
    let counter = provider.counter();
    let audio = service(
        MockFetcher::new().with_page(artist_url, "<html></html>"),
        vec![Box::new(provider)],
    );

    let info = audio.get_info(artist_url).await.unwrap();
    assert_eq!(info.kind, ItemKind::Unknown, "未知类型不是 get_info 的错误");

    assert!(matches!(
        audio.stream(artist_url).await,
        Err(DlKitError::InvalidUrl(_))
    ));
    assert_eq!(calls_of(&counter), 0, "未知类型不应驱动提供商");
}

#[tokio::test]
async fn test_input_validation_happens_before_network() {
    let fetcher = MockFetcher::new().into_shared();
    let audio = AudioService::with_components(fetcher.clone(), vec![], &DlKitConfig::default());

    assert!(matches!(
        audio.get_info("   ").await,
        Err(DlKitError::EmptyInput(_))
    ));
    assert!(matches!(
        audio.get_info("not a link").await,
        Err(DlKitError::InvalidUrl(_))
    ));
    assert!(matches!(
        audio.search("  ", None).await,
        Err(DlKitError::EmptyInput(_))
    ));
    assert!(fetcher.calls().is_empty(), "校验失败时不应发出请求");
}

#[tokio::test]
async fn test_search_defaults_type_to_all() {
    let search_url = "https://meow.mangoi.in/search?q=blinding%20lights&type=all";
    let body = r#"{"query":"blinding lights","type":"all","limit":10,"total_results":1,
        "results":[{"id":"0VjIjW4GlUZAMYd2vXMi3b","url":"https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b",
        "image":"https://i.scdn.co/image/x","duration":200,"artists":"The Weeknd","type":"track",
        "name":"Blinding Lights","release_date":"2019-11-29"}]}"#;
    let audio = service(MockFetcher::new().with_page(search_url, body), vec![]);

    let response = audio.search("blinding lights", Some("")).await.unwrap();

    assert_eq!(response.total_results, 1);
    assert_eq!(response.results[0].name, "Blinding Lights");
    assert_eq!(response.results[0].kind, "track");
    assert!(response.results[0].album.is_empty(), "缺失的字段使用默认值");
}

#[tokio::test]
async fn test_search_non_json_is_parse_failure() {
    let search_url = "https://meow.mangoi.in/search?q=x&type=track";
    let audio = service(
        MockFetcher::new().with_page(search_url, "<html>busy</html>"),
        vec![],
    );

    assert!(matches!(
        audio.search("x", Some("track")).await,
        Err(DlKitError::ParseFailed(_))
    ));
}

#[test]
fn test_provider_lookup() {
    let audio = service(
        MockFetcher::new(),
        vec![
            Box::new(MockProvider::<String>::failing("spotmate")),
            Box::new(MockProvider::<String>::failing("downloaderize")),
        ],
    );

    assert_eq!(audio.provider(" SpotMate ").unwrap().name(), "spotmate");
    assert!(matches!(
        audio.provider(""),
        Err(DlKitError::ProviderNotFound(_))
    ));
    assert!(matches!(
        audio.provider("doesnotexist"),
        Err(DlKitError::ProviderNotFound(_))
    ));
}
