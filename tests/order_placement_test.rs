//! Order placement: totals, price snapshots, stock accounting and rollback.

mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{shipping_address, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{json, Value};
use storefront_api::{
    entities::{product, Order, OrderItem, Product},
    errors::ServiceError,
};
use uuid::Uuid;

async fn stock_of(app: &TestApp, id: Uuid) -> i32 {
    Product::find_by_id(id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("product exists")
        .stock
}

async fn cart_len(app: &TestApp, token: &str) -> usize {
    let (_, cart) = app.json(Method::GET, "/api/cart", None, Some(token)).await;
    cart.as_array().map(Vec::len).unwrap_or_default()
}

async fn place(app: &TestApp, token: &str) -> (StatusCode, Value) {
    app.json(
        Method::POST,
        "/api/orders",
        Some(json!({ "shipping_address": shipping_address() })),
        Some(token),
    )
    .await
}

#[tokio::test]
async fn places_order_from_cart() {
    let app = TestApp::new().await;
    let user = app.register("Buyer", "buyer@example.com").await;
    let keyboard = app.seed_product("Keyboard", dec!(100.00), 10, None).await;
    let mouse = app.seed_product("Mouse", dec!(50.00), 10, None).await;

    app.add_to_cart(&user, keyboard.id, 2).await;
    app.add_to_cart(&user, mouse.id, 1).await;

    let (status, order) = place(&app, &user.token).await;

    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total_amount"].as_f64(), Some(250.0));
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["user_id"], user.id.to_string());
    assert_eq!(order["shipping_address"], shipping_address());
    assert!(order["order_number"]
        .as_str()
        .is_some_and(|n| n.starts_with("ORD-")));

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let keyboard_line = items
        .iter()
        .find(|i| i["product_name"] == "Keyboard")
        .unwrap();
    assert_eq!(keyboard_line["quantity"], 2);
    assert_eq!(keyboard_line["product_price"].as_f64(), Some(100.0));
    assert_eq!(keyboard_line["subtotal"].as_f64(), Some(200.0));

    assert_eq!(stock_of(&app, keyboard.id).await, 8);
    assert_eq!(stock_of(&app, mouse.id).await, 9);
    assert_eq!(cart_len(&app, &user.token).await, 0);
}

#[tokio::test]
async fn order_keeps_prices_from_placement_time() {
    let app = TestApp::new().await;
    let user = app.register("Snapshot", "snapshot@example.com").await;
    let lamp = app.seed_product("Lamp", dec!(40.00), 5, None).await;

    app.add_to_cart(&user, lamp.id, 1).await;
    let (_, order) = place(&app, &user.token).await;

    let mut repriced: product::ActiveModel = Product::find_by_id(lamp.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap()
        .into();
    repriced.price = Set(dec!(99.00));
    repriced.name = Set("Lamp Deluxe".to_string());
    repriced.update(&*app.state.db).await.unwrap();

    let uri = format!("/api/orders/{}", order["id"].as_str().unwrap());
    let (status, fetched) = app
        .json(Method::GET, &uri, None, Some(&user.token))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total_amount"].as_f64(), Some(40.0));
    assert_eq!(fetched["items"][0]["product_price"].as_f64(), Some(40.0));
    assert_eq!(fetched["items"][0]["product_name"], "Lamp");
}

#[tokio::test]
async fn insufficient_stock_rejects_and_leaves_cart_intact() {
    let app = TestApp::new().await;
    let user = app.register("Greedy", "greedy@example.com").await;
    let plenty = app.seed_product("Plenty", dec!(5.00), 100, None).await;
    let scarce = app.seed_product("Scarce", dec!(20.00), 2, None).await;

    app.add_to_cart(&user, plenty.id, 1).await;
    app.add_to_cart(&user, scarce.id, 3).await;

    let (status, body) = place(&app, &user.token).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Insufficient stock for Scarce");

    // Nothing from the failed attempt survives
    assert_eq!(stock_of(&app, plenty.id).await, 100);
    assert_eq!(stock_of(&app, scarce.id).await, 2);
    assert_eq!(cart_len(&app, &user.token).await, 2);
    assert_eq!(Order::find().count(&*app.state.db).await.unwrap(), 0);
    assert_eq!(OrderItem::find().count(&*app.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_orders_for_the_last_unit_sell_it_once() {
    let app = TestApp::new().await;
    let alice = app.register("Alice", "alice@example.com").await;
    let bob = app.register("Bob", "bob@example.com").await;
    let last = app.seed_product("Last One", dec!(75.00), 1, None).await;

    app.add_to_cart(&alice, last.id, 1).await;
    app.add_to_cart(&bob, last.id, 1).await;

    let (first, second) = tokio::join!(place(&app, &alice.token), place(&app, &bob.token));

    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(
        statuses,
        vec![StatusCode::CREATED, StatusCode::UNPROCESSABLE_ENTITY]
    );

    assert_eq!(stock_of(&app, last.id).await, 0);
    assert_eq!(Order::find().count(&*app.state.db).await.unwrap(), 1);

    let loser = if first.0 == StatusCode::CREATED { &bob } else { &alice };
    assert_eq!(cart_len(&app, &loser.token).await, 1);
}

#[tokio::test]
async fn place_order_preconditions() {
    let app = TestApp::new().await;
    let user = app.register("Careful", "careful@example.com").await;

    let (status, body) = place(&app, &user.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart is empty");

    let product = app.seed_product("Thing", dec!(1.00), 1, None).await;
    app.add_to_cart(&user, product.id, 1).await;

    for payload in [
        json!({}),
        json!({ "shipping_address": null }),
        json!({ "shipping_address": "" }),
        json!({ "shipping_address": "   " }),
    ] {
        let (status, body) = app
            .json(Method::POST, "/api/orders", Some(payload), Some(&user.token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Shipping address is required");
    }

    let (status, _) = app
        .json(
            Method::POST,
            "/api/orders",
            Some(json!({ "shipping_address": shipping_address() })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(cart_len(&app, &user.token).await, 1);
}

#[tokio::test]
async fn orders_are_listed_newest_first_and_scoped_to_owner() {
    let app = TestApp::new().await;
    let owner = app.register("Owner", "owner@example.com").await;
    let stranger = app.register("Stranger", "stranger@example.com").await;
    let product = app.seed_product("Repeatable", dec!(12.00), 10, None).await;

    app.add_to_cart(&owner, product.id, 1).await;
    let (_, older) = place(&app, &owner.token).await;
    app.add_to_cart(&owner, product.id, 2).await;
    let (_, newer) = place(&app, &owner.token).await;

    let (status, list) = app
        .json(Method::GET, "/api/orders", None, Some(&owner.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let orders = list.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], newer["id"]);
    assert_eq!(orders[1]["id"], older["id"]);
    assert_eq!(orders[0]["items"][0]["quantity"], 2);
    assert_ne!(orders[0]["order_number"], orders[1]["order_number"]);

    let (_, others) = app
        .json(Method::GET, "/api/orders", None, Some(&stranger.token))
        .await;
    assert!(others.as_array().unwrap().is_empty());

    let uri = format!("/api/orders/{}", older["id"].as_str().unwrap());
    let (status, body) = app
        .json(Method::GET, &uri, None, Some(&stranger.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");

    let (status, _) = app
        .json(Method::GET, "/api/orders/not-an-id", None, Some(&owner.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_reports_insufficient_stock_variant() {
    let app = TestApp::new().await;
    let user = app.register("Direct", "direct@example.com").await;
    let product = app.seed_product("Rare", dec!(1.00), 0, None).await;
    app.add_to_cart(&user, product.id, 1).await;

    let result = app
        .state
        .services
        .orders
        .place_order(user.id, shipping_address())
        .await;

    assert_matches!(result, Err(ServiceError::InsufficientStock(msg)) if msg.contains("Rare"));
}
