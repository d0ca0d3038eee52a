//! Integration tests for the HTTP-backed adapters
//!
//! The Supabase content store and the static fetcher are exercised against a
//! wiremock server standing in for the real service. The Chromium rendering
//! backend renders pages served the same way.

use serde_json::json;
use shelf_drift::config::{BotConfig, Credentials, SourceConfig};
use shelf_drift::crawler::{
    build_http_client, PageFetcher, RenderPlan, RenderedFetcher, SelectorStrategy, StaticFetcher,
};
use shelf_drift::publish::IdentityResolver;
use shelf_drift::render::{ChromiumBackend, ChromiumOptions, RenderBackend, RenderError};
use shelf_drift::storage::{ContentStore, NewPost, PostVariant, StoreError, SupabaseStore};
use shelf_drift::FetchError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE_KEY: &str = "service-role-key";

fn supabase(server: &MockServer) -> SupabaseStore {
    let credentials = Credentials {
        url: server.uri(),
        service_key: SERVICE_KEY.to_string(),
    };
    SupabaseStore::new(&credentials, "outfits").expect("store")
}

// ===== Supabase =====

#[tokio::test]
async fn test_supabase_sends_service_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("username", "eq.InFit_Official"))
        .and(query_param("select", "id"))
        .and(header("apikey", SERVICE_KEY))
        .and(header("authorization", "Bearer service-role-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "bot-1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = supabase(&server);
    let found = store
        .find_profile_by_username("InFit_Official")
        .await
        .unwrap();
    assert_eq!(found.as_deref(), Some("bot-1"));
}

#[tokio::test]
async fn test_supabase_bootstraps_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(body_string_contains("bot@infit.app"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "user": { "id": "acct-9" } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .and(body_string_contains("acct-9"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut resolver = IdentityResolver::new(Arc::new(supabase(&server)), BotConfig::default());
    let bot = resolver.resolve().await.unwrap();
    assert_eq!(bot.id, "acct-9");
}

#[tokio::test]
async fn test_supabase_post_and_variants() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/outfits"))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": "post-1" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/clothing_pieces"))
        .and(body_string_contains("\"outfit_id\":\"post-1\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = supabase(&server);
    let post_id = store
        .insert_post(&NewPost {
            user_id: "bot-1".to_string(),
            image_url: "https://cdn.example/a.jpg".to_string(),
            publisher_height: 180,
            publisher_size: "M".to_string(),
            description: "Robe - 39,99 €\n\nMango - Robe".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(post_id.as_deref(), Some("post-1"));

    let variants: Vec<PostVariant> = ["S", "M"]
        .iter()
        .map(|size| PostVariant {
            post_id: "post-1".to_string(),
            brand: "Mango".to_string(),
            product_name: "Robe".to_string(),
            size: size.to_string(),
            category: "Vêtement".to_string(),
            description: "Mango - Robe".to_string(),
            purchase_link: "https://shop.example/robe.html".to_string(),
        })
        .collect();
    assert_eq!(store.insert_variants(&variants).await.unwrap(), 2);
}

#[tokio::test]
async fn test_supabase_empty_representation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/outfits"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let post_id = supabase(&server)
        .insert_post(&NewPost {
            user_id: "bot-1".to_string(),
            image_url: "u".to_string(),
            publisher_height: 180,
            publisher_size: "M".to_string(),
            description: "d".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(post_id, None);
}

#[tokio::test]
async fn test_supabase_upload_and_public_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/outfits/scraped/1-robe-abcd1234.jpg"))
        .and(header("content-type", "image/jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = supabase(&server);
    store
        .upload_object("scraped/1-robe-abcd1234.jpg", vec![1, 2, 3], "image/jpeg")
        .await
        .unwrap();
    assert_eq!(
        store.public_url("scraped/1-robe-abcd1234.jpg"),
        format!(
            "{}/storage/v1/object/public/outfits/scraped/1-robe-abcd1234.jpg",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_supabase_duplicate_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/outfits/scraped/dup.jpg"))
        .respond_with(ResponseTemplate::new(409).set_body_string("The resource already exists"))
        .mount(&server)
        .await;

    let err = supabase(&server)
        .upload_object("scraped/dup.jpg", vec![0], "image/jpeg")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(ref key) if key == "scraped/dup.jpg"));
}

#[tokio::test]
async fn test_supabase_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let err = supabase(&server)
        .find_profile_by_username("InFit_Official")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 401, .. }));
}

// ===== Chromium =====
//
// These launch a real browser, so they only run on request:
// `cargo test -- --ignored` with Chrome or Chromium installed
// (set SHELF_DRIFT_CHROME to point at a specific executable).

fn chromium_options() -> ChromiumOptions {
    ChromiumOptions {
        headless: true,
        user_agent: "Mozilla/5.0 Test".to_string(),
        chrome_path: std::env::var("SHELF_DRIFT_CHROME").ok(),
        request_timeout: Duration::from_secs(30),
    }
}

fn quick_plan() -> RenderPlan {
    RenderPlan {
        scroll_rounds: 1,
        scroll_delay: Duration::ZERO,
        wait_timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(50),
    }
}

async fn mount_page(server: &MockServer, page_path: &str, markup: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(markup)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
#[ignore = "launches a local Chrome"]
async fn test_rendered_fetch_through_chromium() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/mode-femme/",
        r#"<html><body><article data-testid="product-card"><a href="/a.html"><img src="/a.jpg"></a></article></body></html>"#,
    )
    .await;

    let backend = ChromiumBackend::launch(&chromium_options()).await.unwrap();
    assert!(backend.session().is_open());

    let mut fetcher = RenderedFetcher::new(backend, quick_plan());
    let page = fetcher
        .fetch(&format!("{}/mode-femme/", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.strategy, SelectorStrategy::ProductCard);
    assert!(page.markup.contains("product-card"));

    fetcher.shutdown().await.unwrap();
    assert!(!fetcher.backend().session().is_open());
}

#[tokio::test]
#[ignore = "launches a local Chrome"]
async fn test_chromium_falls_back_to_articles() {
    let server = MockServer::start().await;
    mount_page(&server, "/homme/", "<html><body><p>empty</p></body></html>").await;

    let backend = ChromiumBackend::launch(&chromium_options()).await.unwrap();
    let mut fetcher = RenderedFetcher::new(backend, quick_plan());
    let page = fetcher
        .fetch(&format!("{}/homme/", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.strategy, SelectorStrategy::GenericArticle);

    fetcher.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore = "launches a local Chrome"]
async fn test_closed_chromium_rejects_commands() {
    let mut backend = ChromiumBackend::launch(&chromium_options()).await.unwrap();
    backend.close().await.unwrap();
    backend.close().await.unwrap();

    let err = backend.navigate("https://shop.example/").await.unwrap_err();
    assert!(matches!(err, RenderError::SessionClosed));
}

#[tokio::test]
async fn test_missing_chrome_executable_fails_launch() {
    let options = ChromiumOptions {
        chrome_path: Some("/nonexistent/chrome".to_string()),
        ..chromium_options()
    };

    let result = ChromiumBackend::launch(&options).await;
    assert!(result.is_err());
}

// ===== Static fetcher =====

#[tokio::test]
async fn test_static_fetch_sends_browser_headers() {
    let server = MockServer::start().await;
    let source = SourceConfig {
        user_agent: "ShelfDriftTest/1.0".to_string(),
        accept_language: "fr-FR".to_string(),
        ..SourceConfig::default()
    };
    Mock::given(method("GET"))
        .and(path("/mode-femme/"))
        .and(header("user-agent", source.user_agent.as_str()))
        .and(header("accept-language", source.accept_language.as_str()))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = StaticFetcher::new(build_http_client(&source).unwrap());
    let page = fetcher
        .fetch(&format!("{}/mode-femme/", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.markup, "<html>ok</html>");
    assert_eq!(page.strategy, SelectorStrategy::ProductCard);
}

#[tokio::test]
async fn test_static_fetch_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fetcher = StaticFetcher::new(build_http_client(&SourceConfig::default()).unwrap());
    let err = fetcher
        .fetch(&format!("{}/mode-femme/", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 403, .. }));
}
