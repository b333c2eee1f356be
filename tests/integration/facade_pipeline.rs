//! Facade + HTTP backend + cache end to end

use super::mock_server::MockServerFixture;
use pdf_translate::cache::{MemoryCache, NullCache};
use pdf_translate::config::SettingsLoader;
use pdf_translate::{BatchTranslator, TranslationFacade};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_repeated_segment_calls_service_once() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_completion("你好", 10, 2, 1).await;

    let facade = TranslationFacade::new(
        Arc::new(fixture.backend("zh")),
        Arc::new(MemoryCache::new(64)),
    );
    assert_eq!(facade.translate("Hello").await.unwrap(), "你好");
    assert_eq!(facade.translate("Hello").await.unwrap(), "你好");

    mock.assert_async().await;
    assert_eq!(facade.usage().total, 12);
    assert_eq!(facade.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_ignore_cache_calls_service_every_time() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_completion("你好", 10, 2, 2).await;

    let cache = Arc::new(MemoryCache::new(64));
    let facade = TranslationFacade::new(Arc::new(fixture.backend("zh")), cache.clone())
        .with_ignore_cache(true);
    facade.translate("Hello").await.unwrap();
    facade.translate("Hello").await.unwrap();

    mock.assert_async().await;
    assert!(cache.is_empty());
    assert_eq!(facade.usage().total, 24);
}

#[tokio::test]
async fn test_facade_from_loaded_settings() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_completion("salut", 3, 1, 3).await;

    let settings = SettingsLoader::new()
        .without_env()
        .with_override("openai", true)
        .with_override("openai_detail.openai_api_key", "sk-test")
        .with_override(
            "openai_detail.openai_base_url",
            format!("{}/chat/completions", fixture.base_url),
        )
        .with_override("translation.lang_out", "fr")
        .with_override("translation.qps", 8)
        .load()
        .unwrap()
        .validate()
        .unwrap();

    let facade = Arc::new(
        TranslationFacade::from_settings(&settings, Arc::new(NullCache::new()), CancellationToken::new())
            .unwrap(),
    );
    let batch = BatchTranslator::from_settings(facade.clone(), &settings);
    assert_eq!(batch.max_concurrency(), 8);

    let result = batch.translate_all(vec!["a", "b", "c"]).await;
    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 3);
    mock.assert_async().await;

    let usage = facade.usage();
    assert_eq!((usage.total, usage.prompt, usage.completion), (12, 9, 3));
}
