//! Storefront API
//!
//! REST backend for an online store: catalog browsing, a per-user cart and
//! wishlist, transactional order placement and bearer-token accounts.
//!
//! The router is assembled by [`app_router`]; `src/main.rs` only loads
//! configuration, connects to the database and serves it.

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod migrator;
pub mod observability;
pub mod openapi;
pub mod services;

use crate::{
    auth::{AuthRouterExt, AuthService},
    config::AppConfig,
    errors::ServiceError,
    handlers::AppServices,
};
use axum::{http::HeaderValue, Router};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};
use tracing::{info, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        let auth = Arc::new(AuthService::from_config(&config));
        let services = AppServices::new(db.clone(), auth);
        Self {
            db,
            config,
            services,
        }
    }
}

/// Every `/api` route
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/products", handlers::products::products_routes())
        .nest("/categories", handlers::categories::categories_routes())
        .nest("/cart", handlers::cart::cart_routes().with_auth())
        .nest("/orders", handlers::orders::orders_routes().with_auth())
        .nest("/wishlist", handlers::wishlist::wishlist_routes())
        .merge(health::health_routes())
}

fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        info!("Using permissive CORS because explicit origins were not configured");
        CorsLayer::permissive()
    } else {
        warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// Full application router with the middleware stack applied
pub fn app_router(state: AppState) -> Router {
    errors::expose_internal_details(!state.config.is_production());

    let cors = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let body_limit = state.config.max_body_size;
    let auth_service = state.services.auth.clone();

    Router::new()
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .fallback(|| async { ServiceError::NotFound("Route not found".to_string()) })
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            auth::inject_auth_service,
        ))
        .layer(observability::configure_http_tracing())
        // Outside the trace layer so spans see the id
        .layer(axum::middleware::from_fn(
            observability::request_id_middleware,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(Arc::new(state))
}
