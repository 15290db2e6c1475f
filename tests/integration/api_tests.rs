//! API integration tests for info documents, image redirects and errors.
//!
//! Tests verify:
//! - info.json content, field order and content negotiation
//! - Base URI and image request redirects
//! - Identifiers containing an encoded slash
//! - HTTP status codes and error bodies

use axum::http::StatusCode;

use iiif_gateway::{RouterConfig, ServiceProfile};

use super::test_utils::{
    body_json, body_string, get, get_with_headers, header, location_query, router_with,
    sample_backend, test_router, BACKEND_IMAGE_ENDPOINT, BASE_URI,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = get(test_router(sample_backend()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Info Requests
// =============================================================================

#[tokio::test]
async fn test_info_document() {
    let response = get(test_router(sample_backend()), "/iiif/book/info.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "application/json");
    assert_eq!(header(&response, "cache-control"), "public, max-age=3600");

    let body = body_json(response).await;
    assert_eq!(body["@context"], "http://iiif.io/api/image/2/context.json");
    assert_eq!(body["@id"], format!("{}/book", BASE_URI));
    assert_eq!(body["protocol"], "http://iiif.io/api/image");
    assert_eq!(body["width"], 1000);
    assert_eq!(body["height"], 1500);
    assert_eq!(body["profile"][0], "http://iiif.io/api/image/2/level1.json");
    assert_eq!(body["tiles"][0]["width"], 512);
    assert_eq!(body["sizes"][0]["width"], 63);
    assert_eq!(body["sizes"][0]["height"], 94);
}

#[tokio::test]
async fn test_info_field_order() {
    let response = get(test_router(sample_backend()), "/iiif/book/info.json").await;
    let body = body_string(response).await;

    let keys = [
        "\"@context\"",
        "\"@id\"",
        "\"protocol\"",
        "\"width\"",
        "\"height\"",
        "\"sizes\"",
        "\"tiles\"",
        "\"profile\"",
    ];
    let positions: Vec<usize> = keys
        .iter()
        .map(|key| body.find(key).unwrap_or_else(|| panic!("missing {key} in {body}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{body}");
}

#[tokio::test]
async fn test_info_json_ld_negotiation() {
    let response = get_with_headers(
        test_router(sample_backend()),
        "/iiif/book/info.json",
        &[("accept", "application/ld+json")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "application/ld+json");
}

#[tokio::test]
async fn test_info_jsonp_callback() {
    let response = get(
        test_router(sample_backend()),
        "/iiif/book/info.json?callback=handleInfo",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "application/javascript");

    let body = body_string(response).await;
    let json = body
        .strip_prefix("handleInfo(")
        .and_then(|rest| rest.strip_suffix(");"))
        .unwrap_or_else(|| panic!("not wrapped: {body}"));
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["width"], 1000);
}

#[tokio::test]
async fn test_info_invalid_callback() {
    let response = get(
        test_router(sample_backend()),
        "/iiif/book/info.json?callback=alert(1)",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_callback");
}

#[tokio::test]
async fn test_info_undecodable_query() {
    let response = get(
        test_router(sample_backend()),
        "/iiif/book/info.json?callback=a&callback=b",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&response, "content-type"), "application/json");
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_callback");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_image_request_ignores_query() {
    let response = get(
        test_router(sample_backend()),
        "/iiif/book/full/full/0/default.jpg?callback=a&callback=b",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_info_id_derived_from_headers() {
    let router = router_with(
        sample_backend(),
        ServiceProfile::default(),
        RouterConfig::new().with_tracing(false),
    );
    let response = get_with_headers(
        router,
        "/iiif/book/info.json",
        &[
            ("host", "images.example.net"),
            ("x-forwarded-proto", "https"),
        ],
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(body["@id"], "https://images.example.net/iiif/book");
}

#[tokio::test]
async fn test_info_with_max_dimension() {
    let router = router_with(
        sample_backend(),
        ServiceProfile::default().with_max_dimension(Some(600)),
        RouterConfig::new().with_tracing(false),
    );
    let body = body_json(get(router, "/iiif/book/info.json").await).await;

    assert_eq!(body["profile"][1]["maxWidth"], 600);
    assert_eq!(body["profile"][1]["maxHeight"], 600);
    for size in body["sizes"].as_array().unwrap() {
        assert!(size["width"].as_u64().unwrap() <= 600);
        assert!(size["height"].as_u64().unwrap() <= 600);
    }
}

#[tokio::test]
async fn test_base_uri_redirect() {
    let response = get(test_router(sample_backend()), "/iiif/book").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, "location"), "/iiif/book/info.json");
}

#[tokio::test]
async fn test_base_uri_with_trailing_slash_redirects() {
    let response = get(test_router(sample_backend()), "/iiif/book/").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, "location"), "/iiif/book/info.json");
}

// =============================================================================
// Image Requests
// =============================================================================

#[tokio::test]
async fn test_image_redirect_best_fit() {
    let response = get(
        test_router(sample_backend()),
        "/iiif/book/full/!200,200/0/default.jpg",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(header(&response, "location").starts_with(BACKEND_IMAGE_ENDPOINT));

    let query = location_query(&response);
    assert_eq!(query["source"], "book");
    assert_eq!(query["rect"], "0,0,1,1");
    assert_eq!(query["width"], "133");
    assert_eq!(query["height"], "200");
    assert_eq!(query["profile"], "jpeg");
    assert!(!query.contains_key("effects"));
}

#[tokio::test]
async fn test_image_redirect_region_size_effects() {
    let response = get(
        test_router(sample_backend()),
        "/iiif/square/200,400,400,200/,100/!0/gray.png",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let query = location_query(&response);
    assert_eq!(query["rect"], "0.25,0.5,0.5,0.25");
    assert!(!query.contains_key("width"));
    assert_eq!(query["height"], "100");
    assert_eq!(query["profile"], "png");
    assert_eq!(query["effects"], "grayscale,fliph");
}

#[tokio::test]
async fn test_identifier_with_encoded_slash() {
    let router = test_router(sample_backend());

    let response = get(router.clone(), "/iiif/book%2Fpage1/full/pct:50/0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let query = location_query(&response);
    assert_eq!(query["source"], "book/page1");
    assert_eq!(query["width"], "1000");
    assert_eq!(query["height"], "500");

    let body = body_json(get(router, "/iiif/book%2Fpage1/info.json").await).await;
    assert_eq!(body["@id"], format!("{}/book%2fpage1", BASE_URI));
    assert_eq!(body["width"], 2000);
}

#[tokio::test]
async fn test_cors_headers() {
    let response = get_with_headers(
        test_router(sample_backend()),
        "/iiif/book/info.json",
        &[("origin", "https://viewer.example.com")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "access-control-allow-origin"), "*");
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_error_statuses() {
    let cases = [
        ("/iiif/book/1,2,3/full/0/default.jpg", 400, Some("region")),
        ("/iiif/book/full/1,2,3/0/default.jpg", 400, Some("size")),
        ("/iiif/book/full/abc,/0/default.jpg", 400, Some("size")),
        ("/iiif/book/full/full/361/default.jpg", 400, Some("rotation")),
        ("/iiif/book/full/full/-5/default.jpg", 400, Some("rotation")),
        ("/iiif/book/full/full/0/default", 400, None),
        ("/iiif/book/full/full", 400, None),
        ("/iiif/book/full/full/0/bitonal.jpg", 501, Some("quality")),
        ("/iiif/book/full/full/90/default.jpg", 501, Some("rotation")),
        ("/iiif/book/info.xml", 501, Some("format")),
        ("/iiif/book/full/full/0/default.bmp", 415, Some("format")),
        ("/iiif/unknown/info.json", 404, Some("identifier")),
        ("/iiif/unknown/full/full/0/default.jpg", 404, Some("identifier")),
        ("/iiif/broken/info.json", 500, None),
        ("/iiif/garbled/info.json", 502, None),
    ];

    for (uri, status, parameter) in cases {
        let response = get(test_router(sample_backend()), uri).await;
        assert_eq!(response.status().as_u16(), status, "{uri}");

        let body = body_json(response).await;
        assert_eq!(body["status"], status, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
        match parameter {
            Some(name) => assert_eq!(body["parameter"], name, "{uri}"),
            None => assert!(body.get("parameter").is_none(), "{uri}"),
        }
    }
}

#[tokio::test]
async fn test_malformed_rotation_is_not_unsupported() {
    for uri in [
        "/iiif/book/full/full/361/default.jpg",
        "/iiif/book/full/full/-5/default.jpg",
    ] {
        let response = get(test_router(sample_backend()), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "malformed_rotation", "{uri}");
    }
}

#[tokio::test]
async fn test_exceeds_max_dimension() {
    let router = router_with(
        sample_backend(),
        ServiceProfile::default().with_max_dimension(Some(500)),
        RouterConfig::new().with_tracing(false),
    );

    let response = get(router.clone(), "/iiif/book/full/500,500/0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = get(router, "/iiif/book/full/501,500/0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "exceeds_max_dimension");
}

#[tokio::test]
async fn test_unsupported_region_for_level0_profile() {
    let profile = ServiceProfile {
        compliance: iiif_gateway::ComplianceLevel::Level0,
        profile: iiif_gateway::ImageServerProfile::default(),
        ..ServiceProfile::default()
    };
    let router = router_with(sample_backend(), profile, RouterConfig::new().with_tracing(false));

    let response = get(router.clone(), "/iiif/book/0,0,10,10/full/0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body_json(response).await["error"], "unsupported_region");

    let response = get(router.clone(), "/iiif/book/full/full/!0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unsupported_mirroring");
    assert_eq!(body["parameter"], "rotation");
    assert_eq!(body["message"], "Mirroring is not supported: !0");

    let response = get(router, "/iiif/book/full/full/0/default.jpg").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
