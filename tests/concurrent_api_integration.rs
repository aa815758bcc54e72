//! Concurrent API integration tests
//!
//! These tests verify that concurrent visit registrations neither lose nor
//! double count visitors, particularly on the first visit to a page where
//! every request races to create the page entry.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use footfall::api;
use footfall::config::CorsConfig;
use footfall::counter::{Counter, MemoryCounter};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app() -> (Router, Arc<dyn Counter>) {
    let counter: Arc<dyn Counter> = Arc::new(MemoryCounter::new());
    let app = api::create_api_router(Arc::clone(&counter), &CorsConfig::default());
    (app, counter)
}

fn visit_request(url: &str, visitor_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/visits/new")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "url": url, "visitor_id": visitor_id }).to_string(),
        ))
        .unwrap()
}

async fn send_all(app: &Router, requests: Vec<Request<Body>>) -> usize {
    let mut handles = vec![];

    for request in requests {
        let app_clone = app.clone();
        handles.push(tokio::spawn(async move {
            app_clone.oneshot(request).await.unwrap()
        }));
    }

    let mut success_count = 0;
    for handle in handles {
        let response = handle.await.unwrap();
        if response.status() == StatusCode::OK {
            success_count += 1;
        }
    }
    success_count
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_distinct_visitors_same_page() {
    let (app, counter) = create_test_app();

    let requests = (0..200)
        .map(|i| visit_request("/landing", &format!("visitor-{i}")))
        .collect();

    assert_eq!(send_all(&app, requests).await, 200);
    assert_eq!(counter.visits("/landing").unwrap(), 200, "no lost updates");
    assert_eq!(counter.pages(), 1, "exactly one page entry");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_same_visitor_same_page() {
    let (app, counter) = create_test_app();

    let requests = (0..100)
        .map(|_| visit_request("/landing", "visitor-A"))
        .collect();

    assert_eq!(send_all(&app, requests).await, 100);
    assert_eq!(counter.visits("/landing").unwrap(), 1);
    assert_eq!(counter.pages(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_visits_across_pages() {
    let (app, counter) = create_test_app();

    // 10 pages, 20 visitors each, every visitor reported twice
    let requests = (0..400)
        .map(|i| {
            let page = format!("/page/{}", i % 10);
            let visitor = format!("visitor-{}", (i / 10) % 20);
            visit_request(&page, &visitor)
        })
        .collect();

    assert_eq!(send_all(&app, requests).await, 400);
    assert_eq!(counter.pages(), 10);
    for page in 0..10 {
        assert_eq!(counter.visits(&format!("/page/{page}")).unwrap(), 20);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_reads_during_writes_never_decrease() {
    let (app, counter) = create_test_app();
    counter.add_visit("/live", "visitor-seed").unwrap();

    let reader = {
        let counter = Arc::clone(&counter);
        tokio::spawn(async move {
            let mut last = 0;
            for _ in 0..500 {
                let seen = counter.visits("/live").unwrap();
                assert!(seen >= last, "count went backwards: {seen} < {last}");
                assert!(seen <= 301);
                last = seen;
                tokio::task::yield_now().await;
            }
        })
    };

    let requests = (0..300)
        .map(|i| visit_request("/live", &format!("visitor-{i}")))
        .collect();
    assert_eq!(send_all(&app, requests).await, 300);

    reader.await.unwrap();
    assert_eq!(counter.visits("/live").unwrap(), 301);
}
