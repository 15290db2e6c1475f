//! HTTP backend client tests against a local backend.
//!
//! A small axum app stands in for the image-processing backend and answers
//! dimension lookups with XML.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use iiif_gateway::error::BackendError;
use iiif_gateway::{create_router, HttpImageBackend, ImageBackend, ImageService, RouterConfig, ServiceProfile};

use super::test_utils::{self, body_json, location_query};

async fn info_xml(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("source").map(String::as_str) {
        Some("book/page1") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml")],
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Image><Source>book/page1</Source><Width>2000</Width><Height>1000</Height></Image>"#,
        )
            .into_response(),
        Some("garbled") => "<Image><Width>wide</Width><Height>10</Height></Image>".into_response(),
        Some("overloaded") => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        Some("slow") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "<Image><Width>1</Width><Height>1</Height></Image>".into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the fake backend and return its base URL.
async fn spawn_backend() -> String {
    let app = Router::new().route("/imaging/info", get(info_xml));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/imaging", addr)
}

async fn client(timeout: Duration) -> HttpImageBackend {
    let base = spawn_backend().await;
    HttpImageBackend::new(&base, "info", "image", timeout).unwrap()
}

#[tokio::test]
async fn test_fetch_dimensions() {
    let backend = client(Duration::from_secs(5)).await;
    assert_eq!(
        backend.fetch_dimensions("book/page1").await.unwrap(),
        (2000, 1000)
    );
}

#[tokio::test]
async fn test_not_found() {
    let backend = client(Duration::from_secs(5)).await;
    let err = backend.fetch_dimensions("nothing").await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound(id) if id == "nothing"));
}

#[tokio::test]
async fn test_error_status() {
    let backend = client(Duration::from_secs(5)).await;
    let err = backend.fetch_dimensions("overloaded").await.unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_malformed_reply() {
    let backend = client(Duration::from_secs(5)).await;
    let err = backend.fetch_dimensions("garbled").await.unwrap_err();
    assert!(matches!(err, BackendError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_timeout() {
    let backend = client(Duration::from_millis(200)).await;
    let err = backend.fetch_dimensions("slow").await.unwrap_err();
    assert!(matches!(err, BackendError::Timeout { millis: 200 }));
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Nothing listens on the discard port
    let backend =
        HttpImageBackend::new("http://127.0.0.1:9", "info", "image", Duration::from_secs(2))
            .unwrap();
    let err = backend.fetch_dimensions("a").await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::Unavailable(_) | BackendError::Timeout { .. }
    ));
}

#[tokio::test]
async fn test_end_to_end_through_router() {
    let base = spawn_backend().await;
    let backend = HttpImageBackend::new(&base, "info", "image", Duration::from_secs(5)).unwrap();
    let router = create_router(
        ImageService::new(backend, ServiceProfile::default()),
        RouterConfig::new()
            .with_tracing(false)
            .with_public_base_uri("http://example.org/iiif"),
    );

    let body = body_json(test_utils::get(router.clone(), "/iiif/book%2Fpage1/info.json").await).await;
    assert_eq!(body["width"], 2000);
    assert_eq!(body["height"], 1000);

    let response = test_utils::get(router, "/iiif/book%2Fpage1/0,0,1000,500/full/0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = test_utils::header(&response, "location");
    assert!(location.starts_with(&format!("{}/image?", base)), "{location}");

    let query = location_query(&response);
    assert_eq!(query["source"], "book/page1");
    assert_eq!(query["rect"], "0,0,0.5,0.5");
    assert_eq!(query["width"], "2000");
    assert_eq!(query["height"], "1000");
}
