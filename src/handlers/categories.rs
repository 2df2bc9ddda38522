use crate::{
    entities::category, errors::ApiError, handlers::common::success_response, AppState,
};
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

pub fn categories_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_categories))
}

/// List categories ordered by name
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = [category::Model]),
    )
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(success_response(categories))
}
