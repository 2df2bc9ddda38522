#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use storefront_api::{
    config::AppConfig,
    db,
    entities::{category, product},
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "storefront_test_secret_key_32_chars_min";

/// A registered customer and the token the API issued for them.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Helper harness for spinning up the full router over a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("storefront_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // Concurrent requests queue on the single connection instead of
        // tripping over SQLite's writer lock.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.db_acquire_timeout_secs = 30;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = storefront_api::app_router(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends the request and returns the status together with the decoded body.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Registers a customer through the API.
    pub async fn register(&self, name: &str, email: &str) -> TestUser {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/auth/register",
                Some(json!({ "name": name, "email": email, "password": "secret123" })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");

        TestUser {
            id: body["user"]["id"]
                .as_str()
                .and_then(|id| Uuid::parse_str(id).ok())
                .expect("user id in registration response"),
            email: body["user"]["email"]
                .as_str()
                .expect("email in registration response")
                .to_string(),
            token: body["token"]
                .as_str()
                .expect("token in registration response")
                .to_string(),
        }
    }

    pub async fn seed_category(&self, name: &str, slug: &str) -> category::Model {
        category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed category for tests")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        price: Decimal,
        stock: i32,
        category_id: Option<Uuid>,
    ) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(format!("{} seeded for integration tests", name))),
            price: Set(price),
            original_price: Set(None),
            discount_percent: Set(0),
            category_id: Set(category_id),
            stock: Set(stock),
            rating: Set(Decimal::new(45, 1)),
            review_count: Set(10),
            brand: Set(Some("Acme".to_string())),
            images: Set(json!(["https://img.example.com/1.jpg"])),
            specifications: Set(json!({})),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product for tests")
    }

    /// Adds a product to the user's cart and asserts the call succeeded.
    pub async fn add_to_cart(&self, user: &TestUser, product_id: Uuid, quantity: i32) -> Value {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/cart",
                Some(json!({ "product_id": product_id, "quantity": quantity })),
                Some(&user.token),
            )
            .await;
        assert!(status.is_success(), "add to cart failed: {status} {body}");
        body
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn shipping_address() -> Value {
    json!({
        "name": "Asha Verma",
        "line1": "12 MG Road",
        "city": "Bengaluru",
        "pincode": "560001",
        "phone": "9876543210"
    })
}
