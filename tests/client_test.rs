//! `StorefrontClient` against a mocked API.

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use serde_json::json;
use storefront_api::{
    client::{ClientError, StorefrontClient},
    services::catalog::ProductQuery,
};
use uuid::Uuid;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn product_json(id: Uuid, name: &str, price: f64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "price": price,
        "original_price": null,
        "discount_percent": 0,
        "category_id": null,
        "stock": 4,
        "rating": 4.5,
        "review_count": 12,
        "brand": "Acme",
        "images": [],
        "specifications": {},
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
        "category_name": null,
        "category_slug": null
    })
}

fn cart_line_json(quantity: i32) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": Uuid::new_v4(),
        "product_id": Uuid::new_v4(),
        "quantity": quantity,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
        "name": "Widget",
        "price": 2.5,
        "original_price": null,
        "discount_percent": 0,
        "images": [],
        "stock": 10,
        "brand": null
    })
}

#[tokio::test]
async fn login_posts_credentials_and_returns_token() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "secret123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "user": { "id": user_id, "name": "Ada", "email": "ada@example.com" },
            "token": "jwt-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&server.uri()).unwrap();
    let response = client.login("ada@example.com", "secret123").await.unwrap();

    assert_eq!(response.token, "jwt-token");
    assert_eq!(response.user.id, user_id);
}

#[tokio::test]
async fn products_forwards_query_parameters() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("category", "fashion"))
        .and(query_param("sort", "price"))
        .and(query_param("order", "DESC"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json(id, "Jacket", 59.5)])),
        )
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&format!("{}/api/", server.uri())).unwrap();
    let products = client
        .products(&ProductQuery {
            category: Some("fashion".into()),
            search: None,
            sort: Some("price".into()),
            order: Some("DESC".into()),
        })
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, id);
    assert_eq!(products[0].price, dec!(59.5));
}

#[tokio::test]
async fn authenticated_calls_send_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([cart_line_json(2), cart_line_json(3)])),
        )
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&server.uri())
        .unwrap()
        .with_token("jwt-token");

    assert_eq!(client.cart_count().await.unwrap(), 5);
}

#[tokio::test]
async fn error_bodies_become_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "No token provided" })),
        )
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&server.uri()).unwrap();
    let err = client.cart().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_matches!(err, ClientError::Api { message, .. } if message == "No token provided");
}

#[tokio::test]
async fn non_json_error_bodies_fall_back_to_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&server.uri()).unwrap();
    let err = client.health().await.unwrap_err();

    assert_matches!(err, ClientError::Api { status: 503, message } if message == "Service Unavailable");
}

#[tokio::test]
async fn wishlist_check_reads_flag() {
    let server = MockServer::start().await;
    let product_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/wishlist/check"))
        .and(query_param("product_id", product_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "inWishlist": true })))
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&server.uri()).unwrap().with_token("t");
    assert!(client.check_wishlist(product_id).await.unwrap());
}

#[tokio::test]
async fn place_order_sends_shipping_address() {
    let server = MockServer::start().await;
    let address = json!({ "line1": "1 Main St", "city": "Pune" });
    let order_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json(json!({ "shipping_address": address })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": order_id,
            "user_id": Uuid::new_v4(),
            "order_number": "ORD-20240501100000-ABCDEFGH",
            "total_amount": 250.0,
            "shipping_address": address,
            "status": "confirmed",
            "created_at": "2024-05-01T10:00:00Z",
            "items": []
        })))
        .mount(&server)
        .await;

    let client = StorefrontClient::new(&server.uri()).unwrap().with_token("t");
    let order = client.place_order(address.clone()).await.unwrap();

    assert_eq!(order.id, order_id);
    assert_eq!(order.total_amount, dec!(250));
}
