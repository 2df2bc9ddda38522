use crate::{
    errors::{ApiError, ErrorResponse},
    handlers::common::{parse_id, success_response},
    services::catalog::{ProductQuery, ProductView},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// List products with optional category, search and sort filters
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Matching products", body = [ProductView]),
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.services.catalog.list_products(query).await?;
    Ok(success_response(products))
}

/// Get a single product
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product id (UUID)")),
    responses(
        (status = 200, description = "Product", body = ProductView),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "Product not found")?;
    let product = state.services.catalog.get_product(id).await?;
    Ok(success_response(product))
}
