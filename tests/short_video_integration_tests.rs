mod common;

use common::{MockFetcher, MockProvider, calls_of, init_tracing, load_test_data};
use dlkit_rs::error::DlKitError;
use dlkit_rs::model::{MediaKind, MediaSource, PostStreamResult};
use dlkit_rs::platforms::ShortVideoService;

const REEL_URL: &str = "https://www.instagram.com/reel/DN6IZn3Eh2z/";

fn reel_fetcher() -> MockFetcher {
    MockFetcher::new().with_page(REEL_URL, load_test_data("post_reel.html"))
}

fn mixed_media() -> PostStreamResult {
    PostStreamResult::from_sources(
        "",
        "",
        vec![
            MediaSource::new("https://cdn.example/photo.jpg", MediaKind::Image),
            MediaSource::new("https://cdn.example/clip.mp4", MediaKind::Video)
                .with_thumbnail("https://cdn.example/clip.jpg"),
            MediaSource::new("https://cdn.example/other.mp4", MediaKind::Video),
        ],
    )
}

#[tokio::test]
async fn test_get_info_from_meta_description() {
    init_tracing();

    let service = ShortVideoService::with_components(reel_fetcher().into_shared(), vec![]);
    let record = service.get_info(REEL_URL).await.unwrap();

    assert_eq!(record.id, "DN6IZn3Eh2z");
    assert_eq!(record.username, "travelbug");
    assert_eq!(record.likes, "1,234");
    assert_eq!(record.comments, "56");
    assert_eq!(record.date, "2024-03-03");
    assert_eq!(record.caption, "Sunrise over the dunes #desert");
    assert_eq!(
        record.thumbnail,
        "https://scontent.cdninstagram.com/v/reel-thumb.jpg"
    );
}

#[tokio::test]
async fn test_invalid_url_never_reaches_network() {
    let fetcher = MockFetcher::new().into_shared();
    let provider = MockProvider::always("mock", mixed_media());
    let counter = provider.counter();
    let service = ShortVideoService::with_components(fetcher.clone(), vec![Box::new(provider)]);

    assert!(matches!(
        service.get_info("https://www.instagram.com/natgeo/").await,
        Err(DlKitError::InvalidUrl(_))
    ));
    assert!(matches!(
        service.stream("https://example.com/reel/abc").await,
        Err(DlKitError::InvalidUrl(_))
    ));
    assert!(matches!(
        service.stream("  ").await,
        Err(DlKitError::EmptyInput(_))
    ));

    assert!(fetcher.calls().is_empty(), "校验失败时不应抓取页面");
    assert_eq!(calls_of(&counter), 0, "校验失败时不应调用提供商");
}

#[tokio::test]
async fn test_stream_backfills_from_record_after_fallback() {
    init_tracing();

    let first = MockProvider::<PostStreamResult>::failing("first");
    let second = MockProvider::always("second", mixed_media());
    let (c1, c2) = (first.counter(), second.counter());
    let service = ShortVideoService::with_components(
        reel_fetcher().into_shared(),
        vec![Box::new(first), Box::new(second)],
    );

    let result = service.stream(REEL_URL).await.unwrap();

    assert_eq!(calls_of(&c1), 1);
    assert_eq!(calls_of(&c2), 1);
    assert_eq!(result.caption, "Sunrise over the dunes #desert", "正文应由规范记录补齐");
    assert_eq!(result.username, "travelbug");

    assert_eq!(result.total, 3);
    assert_eq!(result.video, 2);
    assert_eq!(result.photo, 1);
    let kinds: Vec<_> = result.source.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [MediaKind::Video, MediaKind::Video, MediaKind::Image],
        "视频排在图片之前"
    );
    let indices: Vec<_> = result.source.iter().map(|s| s.index).collect();
    assert_eq!(indices, [0, 1, 2]);
}

#[tokio::test]
async fn test_stream_result_json_shape() {
    let service = ShortVideoService::with_components(
        reel_fetcher().into_shared(),
        vec![Box::new(MockProvider::always("mock", mixed_media()))],
    );

    let result = service.stream(REEL_URL).await.unwrap();
    let json = serde_json::to_string_pretty(&result).unwrap();
    insta::assert_snapshot!("stream_result_json", json);
}

#[tokio::test]
async fn test_provider_caption_is_not_overwritten() {
    let mut answer = mixed_media();
    answer.caption = "provider caption".to_string();
    let service = ShortVideoService::with_components(
        reel_fetcher().into_shared(),
        vec![Box::new(MockProvider::always("mock", answer))],
    );

    let result = service.stream(REEL_URL).await.unwrap();
    assert_eq!(result.caption, "provider caption");
    assert_eq!(result.username, "travelbug");
}

#[tokio::test]
async fn test_empty_media_counts_as_failure() {
    let empty = MockProvider::always("empty", PostStreamResult::from_sources("c", "u", vec![]));
    let service =
        ShortVideoService::with_components(reel_fetcher().into_shared(), vec![Box::new(empty)]);

    match service.stream(REEL_URL).await {
        Err(DlKitError::ProviderExhausted(platform)) => assert_eq!(platform, "short_video"),
        other => panic!("应当返回 ProviderExhausted，实际为 {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_page_fails_before_providers() {
    let provider = MockProvider::always("mock", mixed_media());
    let counter = provider.counter();
    let service = ShortVideoService::with_components(
        MockFetcher::new().into_shared(),
        vec![Box::new(provider)],
    );

    assert!(matches!(
        service.stream(REEL_URL).await,
        Err(DlKitError::FetchFailed(_))
    ));
    assert_eq!(calls_of(&counter), 0);
}

#[test]
fn test_named_provider_lookup() {
    let service = ShortVideoService::with_components(
        MockFetcher::new().into_shared(),
        vec![
            Box::new(MockProvider::<PostStreamResult>::failing("fastvideosave")),
            Box::new(MockProvider::<PostStreamResult>::failing("thesocialcat")),
        ],
    );

    assert_eq!(service.provider_names(), vec!["fastvideosave", "thesocialcat"]);
    assert_eq!(service.provider("TheSocialCat").unwrap().name(), "thesocialcat");
    assert!(matches!(
        service.provider("snapinsta"),
        Err(DlKitError::ProviderNotFound(_))
    ));
}
