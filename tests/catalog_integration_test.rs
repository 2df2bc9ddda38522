//! Product listing, filtering, sorting and category browsing.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::Value;

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array response")
        .iter()
        .map(|p| p["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

async fn seeded_catalog() -> TestApp {
    let app = TestApp::new().await;

    let mobiles = app.seed_category("Mobiles & Tablets", "electronics").await;
    let electronics = app.seed_category("Electronics", "electronics").await;
    let fashion = app.seed_category("Fashion", "fashion").await;

    app.seed_product("Galaxy Phone", dec!(899.00), 10, Some(mobiles.id))
        .await;
    app.seed_product("Noise Cancelling Headphones", dec!(299.99), 5, Some(electronics.id))
        .await;
    app.seed_product("Denim Jacket", dec!(59.50), 20, Some(fashion.id))
        .await;
    app.seed_product("100% Cotton Tee", dec!(15.00), 40, Some(fashion.id))
        .await;
    app.seed_product("Mystery Box", dec!(5.00), 1, None).await;

    app
}

#[tokio::test]
async fn lists_every_product_with_its_category() {
    let app = seeded_catalog().await;

    let (status, body) = app.json(Method::GET, "/api/products", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 5);

    let jacket = products
        .iter()
        .find(|p| p["name"] == "Denim Jacket")
        .expect("jacket listed");
    assert_eq!(jacket["category_name"], "Fashion");
    assert_eq!(jacket["category_slug"], "fashion");
    assert_eq!(jacket["price"].as_f64(), Some(59.5));

    let mystery = products
        .iter()
        .find(|p| p["name"] == "Mystery Box")
        .expect("uncategorized product listed");
    assert!(mystery["category_name"].is_null());
}

#[tokio::test]
async fn category_slug_matches_every_category_sharing_it() {
    let app = seeded_catalog().await;

    let (status, body) = app
        .json(Method::GET, "/api/products?category=electronics&sort=name", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body),
        vec!["Galaxy Phone", "Noise Cancelling Headphones"]
    );
}

#[tokio::test]
async fn unknown_category_slug_is_ignored() {
    let app = seeded_catalog().await;

    let (status, body) = app
        .json(Method::GET, "/api/products?category=garden", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (_, body) = app
        .json(Method::GET, "/api/products?category=garden&search=denim", None, None)
        .await;
    assert_eq!(names(&body), vec!["Denim Jacket"]);
}

#[tokio::test]
async fn search_is_case_insensitive_over_name_and_description() {
    let app = seeded_catalog().await;

    let (_, body) = app
        .json(Method::GET, "/api/products?search=JACKET", None, None)
        .await;
    assert_eq!(names(&body), vec!["Denim Jacket"]);

    // Every seeded description contains "seeded"
    let (_, body) = app
        .json(Method::GET, "/api/products?search=seeded", None, None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let app = seeded_catalog().await;

    let (_, body) = app
        .json(Method::GET, "/api/products?search=100%25", None, None)
        .await;
    assert_eq!(names(&body), vec!["100% Cotton Tee"]);

    let (_, body) = app
        .json(Method::GET, "/api/products?search=_", None, None)
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sorts_by_allowed_column_and_direction() {
    let app = seeded_catalog().await;

    let (_, body) = app
        .json(Method::GET, "/api/products?sort=price&order=desc", None, None)
        .await;
    assert_eq!(
        names(&body),
        vec![
            "Galaxy Phone",
            "Noise Cancelling Headphones",
            "Denim Jacket",
            "100% Cotton Tee",
            "Mystery Box"
        ]
    );

    let (_, body) = app
        .json(Method::GET, "/api/products?sort=price&order=ASC", None, None)
        .await;
    assert_eq!(names(&body).first().map(String::as_str), Some("Mystery Box"));
}

#[tokio::test]
async fn unknown_sort_column_is_not_an_error() {
    let app = seeded_catalog().await;

    let (status, body) = app
        .json(
            Method::GET,
            "/api/products?sort=price;DROP%20TABLE%20products&order=sideways",
            None,
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn filters_combine() {
    let app = seeded_catalog().await;

    let (_, body) = app
        .json(
            Method::GET,
            "/api/products?category=fashion&search=denim",
            None,
            None,
        )
        .await;
    assert_eq!(names(&body), vec!["Denim Jacket"]);
}

#[tokio::test]
async fn fetches_single_product() {
    let app = TestApp::new().await;
    let fashion = app.seed_category("Fashion", "fashion").await;
    let product = app
        .seed_product("Linen Shirt", dec!(39.00), 3, Some(fashion.id))
        .await;

    let (status, body) = app
        .json(
            Method::GET,
            &format!("/api/products/{}", product.id),
            None,
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], product.id.to_string());
    assert_eq!(body["stock"], 3);
    assert_eq!(body["category_slug"], "fashion");
    assert_eq!(body["images"][0], "https://img.example.com/1.jpg");
}

#[tokio::test]
async fn repeated_product_reads_are_identical() {
    let app = TestApp::new().await;
    let product = app.seed_product("Stable", dec!(12.34), 7, None).await;
    let uri = format!("/api/products/{}", product.id);

    let (_, first) = app.json(Method::GET, &uri, None, None).await;
    let (_, second) = app.json(Method::GET, &uri, None, None).await;

    assert_eq!(first, second);
    assert_eq!(first["price"].as_f64(), Some(12.34));
}

#[tokio::test]
async fn missing_or_malformed_product_id_is_not_found() {
    let app = TestApp::new().await;

    for uri in [
        format!("/api/products/{}", uuid::Uuid::new_v4()),
        "/api/products/42".to_string(),
    ] {
        let (status, body) = app.json(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Product not found");
    }
}

#[tokio::test]
async fn categories_are_ordered_by_name() {
    let app = seeded_catalog().await;

    let (status, body) = app.json(Method::GET, "/api/categories", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body),
        vec!["Electronics", "Fashion", "Mobiles & Tablets"]
    );
}
