//! Integration tests for the scrape-and-publish pipeline
//!
//! These tests use wiremock to stand in for the catalog site (listing pages
//! and product images) and an in-memory SQLite content store, and run the
//! orchestrator end-to-end.

use shelf_drift::config::{Config, PacingConfig, SourceConfig};
use shelf_drift::crawler::{build_http_client, Orchestrator, RunOptions, StaticFetcher};
use shelf_drift::output::{Reporter, RunSummary};
use shelf_drift::storage::SqliteStore;
use shelf_drift::url::{CategoryQuery, ListingFilters, SortOrder};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUBLIC_BASE: &str = "http://localhost:8000/storage";
const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

/// Creates a test configuration pointing at the mock site, with no pauses
fn create_test_config(origin: &str) -> Config {
    Config {
        source: SourceConfig {
            origin: origin.to_string(),
            ..SourceConfig::default()
        },
        pacing: PacingConfig::immediate(),
        ..Config::default()
    }
}

fn product_card(n: usize) -> String {
    format!(
        r#"<article data-testid="product-card">
             <a href="/produit-{n}.html">
               <img src="/img/{n}.jpg?imwidth=300&filter=packshot">
             </a>
             <h2>Marque {n}</h2>
             <h3>Robe {n}</h3>
             <p class="cat_price">{n}9,99 €</p>
           </article>"#
    )
}

fn listing_page(cards: usize) -> String {
    let body: String = (1..=cards).map(product_card).collect();
    format!("<html><head><title>Mode femme</title></head><body>{}</body></html>", body)
}

async fn mount_listing(server: &MockServer, listing_path: &str, cards: usize) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(cards))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, n: usize, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/img/{}.jpg", n)))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_bytes(JPEG_BYTES.to_vec())
                .insert_header("content-type", "image/jpeg"),
        )
        .mount(server)
        .await;
}

fn memory_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new_in_memory(PUBLIC_BASE, "outfits").expect("in-memory store"))
}

fn orchestrator(config: &Config, store: Arc<SqliteStore>, dry_run: bool) -> Orchestrator {
    let client = build_http_client(&config.source).expect("http client");
    Orchestrator::new(config, store, client.clone(), RunOptions { dry_run })
        .expect("orchestrator")
        .with_fetcher(Box::new(StaticFetcher::new(client)))
        .with_reporter(Reporter::sink())
}

#[tokio::test]
async fn test_end_to_end_two_products() {
    let server = MockServer::start().await;
    mount_listing(&server, "/mode-femme/", 2).await;
    mount_image(&server, 1, 200).await;
    mount_image(&server, 2, 200).await;

    let config = create_test_config(&server.uri());
    let store = memory_store();

    let query = CategoryQuery::new("mode-femme").with_limit(2);
    assert_eq!(
        query.listing_url(&server.uri()),
        format!("{}/mode-femme/", server.uri())
    );

    let summary = orchestrator(&config, store.clone(), false)
        .run_once(&query)
        .await
        .expect("run");

    assert_eq!(
        summary,
        RunSummary {
            succeeded: 2,
            failed: 0
        }
    );

    let post_ids = store.post_ids().unwrap();
    assert_eq!(post_ids.len(), 2);
    assert_eq!(store.count_variants().unwrap(), 8);

    let post = store.get_post(&post_ids[0]).unwrap().expect("post row");
    assert_eq!(post.publisher_height, 180);
    assert_eq!(post.publisher_size, "M");
    assert_eq!(post.description, "Robe 1 - 19,99 €\n\nMarque 1 - Robe 1");
    assert!(post.image_url.starts_with(&format!("{}/outfits/scraped/", PUBLIC_BASE)));

    // The stored object is the downloaded image
    let key = post
        .image_url
        .trim_start_matches(&format!("{}/outfits/", PUBLIC_BASE))
        .to_string();
    assert!(key.contains("-robe-1-"));
    let (content_type, bytes) = store.get_object(&key).unwrap().expect("stored image");
    assert_eq!(content_type, "image/jpeg");
    assert_eq!(bytes, JPEG_BYTES);

    let variants = store.variants_for_post(&post_ids[0]).unwrap();
    let sizes: Vec<_> = variants.iter().map(|v| v.size.as_str()).collect();
    assert_eq!(sizes, vec!["S", "M", "L", "XL"]);
    for variant in &variants {
        assert_eq!(variant.brand, "Marque 1");
        assert_eq!(variant.product_name, "Robe 1");
        assert_eq!(variant.category, "Vêtement");
        assert_eq!(variant.description, "Marque 1 - Robe 1");
        assert_eq!(
            variant.purchase_link,
            format!("{}/produit-1.html", server.uri())
        );
    }
}

#[tokio::test]
async fn test_fetch_status_failure_reports_no_products() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mode-femme/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let store = memory_store();

    let summary = orchestrator(&config, store.clone(), false)
        .run_once(&CategoryQuery::new("mode-femme"))
        .await
        .expect("fetch failure must not abort the run");

    assert!(summary.is_empty());
    assert!(store.post_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_transport_failure_reports_no_products() {
    // Bind a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let origin = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let config = create_test_config(&origin);
    let store = memory_store();

    let summary = orchestrator(&config, store.clone(), false)
        .run_once(&CategoryQuery::new("mode-femme"))
        .await
        .expect("transport failure must not abort the run");

    assert!(summary.is_empty());
    assert!(store.post_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_dry_run_never_publishes() {
    let server = MockServer::start().await;
    mount_listing(&server, "/mode-femme/", 3).await;

    // No image may be downloaded under dry-run
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/img/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let store = memory_store();

    let summary = orchestrator(&config, store.clone(), true)
        .run_once(&CategoryQuery::new("mode-femme"))
        .await
        .expect("run");

    assert_eq!(
        summary,
        RunSummary {
            succeeded: 3,
            failed: 0
        }
    );
    assert!(store.post_ids().unwrap().is_empty());
    assert_eq!(store.count_variants().unwrap(), 0);
    assert_eq!(store.count_accounts("bot@infit.app").unwrap(), 0);
}

#[tokio::test]
async fn test_partial_failure_is_isolated() {
    let server = MockServer::start().await;
    mount_listing(&server, "/mode-femme/", 3).await;
    mount_image(&server, 1, 200).await;
    mount_image(&server, 2, 404).await;
    mount_image(&server, 3, 200).await;

    let config = create_test_config(&server.uri());
    let store = memory_store();

    let summary = orchestrator(&config, store.clone(), false)
        .run_once(&CategoryQuery::new("mode-femme").with_limit(3))
        .await
        .expect("run");

    assert_eq!(
        summary,
        RunSummary {
            succeeded: 2,
            failed: 1
        }
    );

    let post_ids = store.post_ids().unwrap();
    assert_eq!(post_ids.len(), 2);
    assert_eq!(store.count_variants().unwrap(), 8);

    for id in &post_ids {
        for variant in store.variants_for_post(id).unwrap() {
            assert_ne!(variant.product_name, "Robe 2");
        }
    }
}

#[tokio::test]
async fn test_limit_caps_processed_cards() {
    let server = MockServer::start().await;
    mount_listing(&server, "/homme/", 10).await;

    let config = create_test_config(&server.uri());

    let summary = orchestrator(&config, memory_store(), true)
        .run_once(&CategoryQuery::new("homme").with_limit(4))
        .await
        .expect("run");

    assert_eq!(summary.total(), 4);
}

#[tokio::test]
async fn test_filters_reach_the_site() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mode-homme/"))
        .and(query_param("activation_date", "0-7"))
        .and(query_param("price_to", "50"))
        .and(query_param("order", "newest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());
    let filters = ListingFilters::new()
        .new_arrivals(7)
        .price_to(50)
        .order(SortOrder::Newest);
    let query = CategoryQuery::new("mode-homme").with_filters(filters);

    let summary = orchestrator(&config, memory_store(), true)
        .run_once(&query)
        .await
        .expect("run");

    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn test_legacy_card_markup() {
    let server = MockServer::start().await;
    let markup = r#"<html><body>
        <div class="cat_articleCard">
          <a href="/jean.html"><img data-src="/img/jean.jpg"></a>
          <div class="cat_brandName">Levi's</div>
          <div class="cat_articleName">Jean 501</div>
          <span data-testid="price">89,95 €</span>
        </div>
      </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/homme/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(markup))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri());

    let summary = orchestrator(&config, memory_store(), true)
        .run_once(&CategoryQuery::new("homme"))
        .await
        .expect("run");

    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn test_identity_created_once_across_runs() {
    let server = MockServer::start().await;
    for (n, category) in [(1, "mode-femme"), (2, "homme")] {
        Mock::given(method("GET"))
            .and(path(format!("/{}/", category)))
            .respond_with(ResponseTemplate::new(200).set_body_string(product_card(n)))
            .mount(&server)
            .await;
        mount_image(&server, n, 200).await;
    }

    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("shelf.db");
    let config = create_test_config(&server.uri());

    // Each run opens its own store, as separate processes would
    for category in ["mode-femme", "homme"] {
        let store = Arc::new(SqliteStore::new(&db_path, PUBLIC_BASE, "outfits").expect("store"));
        let summary = orchestrator(&config, store, false)
            .run_once(&CategoryQuery::new(category))
            .await
            .expect("run");
        assert_eq!(summary.succeeded, 1);
    }

    let store = SqliteStore::new(&db_path, PUBLIC_BASE, "outfits").expect("store");
    assert_eq!(store.count_accounts("bot@infit.app").unwrap(), 1);

    let post_ids = store.post_ids().unwrap();
    assert_eq!(post_ids.len(), 2);
    let first = store.get_post(&post_ids[0]).unwrap().unwrap();
    let second = store.get_post(&post_ids[1]).unwrap().unwrap();
    assert_eq!(first.user_id, second.user_id);
}
