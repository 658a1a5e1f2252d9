//! Storefront HTTP tests that need no database.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use sillage_integration_tests::{session_cookie, storefront_app, storefront_app_with_perfumes};

fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = storefront_app()
        .oneshot(get("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Guest cart
// =============================================================================

#[tokio::test]
async fn test_guest_cart_add_and_count_with_session_cookie() {
    let app = storefront_app_with_perfumes(&[3]).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/cart/items",
            &json!({ "perfume_id": 3, "quantity": 2 }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response).unwrap();
    assert!(cookie.starts_with("sillage_session="));
    assert_eq!(body_json(response).await, json!({ "count": 2 }));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/cart/items",
            &json!({ "perfume_id": 3 }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "count": 3 }));

    let response = app
        .oneshot(get("/api/cart/count", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "count": 3 }));
}

#[tokio::test]
async fn test_guest_cart_update_and_remove() {
    let app = storefront_app_with_perfumes(&[8]).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/cart/items",
            &json!({ "perfume_id": 8, "quantity": 1 }),
            None,
        ))
        .await
        .unwrap();
    let cookie = session_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/cart/items/8",
            &json!({ "quantity": 5 }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "count": 5 }));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cart/items/8")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "count": 0 }));

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cart/items/8")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guest_cart_rejects_non_positive_quantity() {
    let response = storefront_app()
        .oneshot(json_request(
            "POST",
            "/api/cart/items",
            &json!({ "perfume_id": 3, "quantity": 0 }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_empty_guest_count_is_zero() {
    let response = storefront_app()
        .oneshot(get("/api/cart/count", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({ "count": 0 }));
}

// =============================================================================
// Validation and auth
// =============================================================================

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let response = storefront_app()
        .oneshot(json_request(
            "POST",
            "/api/newsletter",
            &json!({ "email": "not-an-email" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Please enter a valid email address" })
    );
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let response = storefront_app()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &json!({ "email": "ana@example.com", "password": "short" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_sign_in() {
    for uri in ["/api/account", "/api/account/orders", "/api/wishlist"] {
        let response = storefront_app().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = storefront_app()
        .oneshot(json_request("POST", "/api/checkout", &json!({}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
