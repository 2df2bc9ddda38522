//! Cart lifecycle through the HTTP surface.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn cart_requires_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app.json(Method::GET, "/api/cart", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "No token provided" }));

    let (status, body) = app
        .json(Method::GET, "/api/cart", None, Some("garbage"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn adding_the_same_product_twice_merges_quantities() {
    let app = TestApp::new().await;
    let user = app.register("Cart User", "cart@example.com").await;
    let product = app.seed_product("Desk Lamp", dec!(25.00), 10, None).await;

    let (status, first) = app
        .json(
            Method::POST,
            "/api/cart",
            Some(json!({ "product_id": product.id, "quantity": 2 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["quantity"], 2);

    let (status, second) = app
        .json(
            Method::POST,
            "/api/cart",
            Some(json!({ "product_id": product.id, "quantity": 3 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["quantity"], 5);

    let (_, cart) = app
        .json(Method::GET, "/api/cart", None, Some(&user.token))
        .await;
    let lines = cart.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);
    assert_eq!(lines[0]["name"], "Desk Lamp");
    assert_eq!(lines[0]["price"].as_f64(), Some(25.0));
    assert_eq!(lines[0]["stock"], 10);
    assert_eq!(lines[0]["brand"], "Acme");
}

#[tokio::test]
async fn quantity_defaults_to_one() {
    let app = TestApp::new().await;
    let user = app.register("Default Qty", "qty@example.com").await;
    let product = app.seed_product("Notebook", dec!(3.50), 10, None).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/cart",
            Some(json!({ "product_id": product.id })),
            Some(&user.token),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 1);
}

#[tokio::test]
async fn add_rejects_bad_input() {
    let app = TestApp::new().await;
    let user = app.register("Bad Input", "bad@example.com").await;
    let product = app.seed_product("Pen", dec!(1.00), 10, None).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/cart",
            Some(json!({ "quantity": 1 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product ID is required");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/cart",
            Some(json!({ "product_id": product.id, "quantity": 0 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must be at least 1");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/cart",
            Some(json!({ "product_id": Uuid::new_v4(), "quantity": 1 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn lists_newest_first() {
    let app = TestApp::new().await;
    let user = app.register("Order Of Adds", "order@example.com").await;
    let first = app.seed_product("First", dec!(1.00), 10, None).await;
    let second = app.seed_product("Second", dec!(2.00), 10, None).await;

    app.add_to_cart(&user, first.id, 1).await;
    app.add_to_cart(&user, second.id, 1).await;

    let (_, cart) = app
        .json(Method::GET, "/api/cart", None, Some(&user.token))
        .await;
    let names: Vec<&str> = cart
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|line| line["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn update_sets_quantity_on_owned_rows_only() {
    let app = TestApp::new().await;
    let owner = app.register("Owner", "owner@example.com").await;
    let other = app.register("Other", "other@example.com").await;
    let product = app.seed_product("Mug", dec!(9.99), 10, None).await;

    let row = app.add_to_cart(&owner, product.id, 1).await;
    let uri = format!("/api/cart/{}", row["id"].as_str().unwrap());

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            Some(json!({ "quantity": 4 })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 4);

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            Some(json!({ "quantity": 7 })),
            Some(&other.token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cart item not found");

    for payload in [json!({}), json!({ "quantity": 0 })] {
        let (status, body) = app
            .json(Method::PUT, &uri, Some(payload), Some(&owner.token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Valid quantity is required");
    }
}

#[tokio::test]
async fn remove_and_clear() {
    let app = TestApp::new().await;
    let user = app.register("Remover", "remove@example.com").await;
    let a = app.seed_product("A", dec!(1.00), 10, None).await;
    let b = app.seed_product("B", dec!(2.00), 10, None).await;
    let c = app.seed_product("C", dec!(3.00), 10, None).await;

    let row = app.add_to_cart(&user, a.id, 1).await;
    app.add_to_cart(&user, b.id, 1).await;
    app.add_to_cart(&user, c.id, 2).await;

    let uri = format!("/api/cart/{}", row["id"].as_str().unwrap());
    let (status, body) = app
        .json(Method::DELETE, &uri, None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item removed from cart");

    let (status, _) = app
        .json(Method::DELETE, &uri, None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .json(Method::DELETE, "/api/cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart cleared");

    let (_, cart) = app
        .json(Method::GET, "/api/cart", None, Some(&user.token))
        .await;
    assert!(cart.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn carts_are_isolated_per_user() {
    let app = TestApp::new().await;
    let alice = app.register("Alice", "alice@example.com").await;
    let bob = app.register("Bob", "bob@example.com").await;
    let product = app.seed_product("Shared Thing", dec!(10.00), 10, None).await;

    app.add_to_cart(&alice, product.id, 2).await;
    app.add_to_cart(&bob, product.id, 1).await;

    let (_, alice_cart) = app
        .json(Method::GET, "/api/cart", None, Some(&alice.token))
        .await;
    let (_, bob_cart) = app
        .json(Method::GET, "/api/cart", None, Some(&bob.token))
        .await;

    assert_eq!(alice_cart[0]["quantity"], 2);
    assert_eq!(bob_cart[0]["quantity"], 1);
    assert_ne!(alice_cart[0]["id"], bob_cart[0]["id"]);
}
