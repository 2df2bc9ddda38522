use crate::{
    auth::AuthUser,
    errors::{ApiError, ErrorResponse},
    handlers::common::{created_response, parse_id, success_response, JsonBody},
    services::orders::{address_is_blank, OrderView},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Order routes; every one requires a signed-in user
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/:id", get(get_order))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Free-form address object, stored as given
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<serde_json::Value>,
}

/// List the caller's orders with their items
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Orders, newest first", body = [OrderView]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.services.orders.list(user.user_id).await?;
    Ok(success_response(orders))
}

/// Get one of the caller's orders
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order id (UUID)")),
    responses(
        (status = 200, description = "Order with items", body = OrderView),
        (status = 404, description = "Order not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "Order not found")?;
    let order = state.services.orders.get(user.user_id, id).await?;
    Ok(success_response(order))
}

/// Place an order from the caller's cart
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderView),
        (status = 400, description = "Missing address or empty cart", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(payload): JsonBody<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let shipping_address = payload
        .shipping_address
        .filter(|address| !address_is_blank(address))
        .ok_or_else(|| ApiError::BadRequest("Shipping address is required".to_string()))?;

    let order = state
        .services
        .orders
        .place_order(user.user_id, shipping_address)
        .await?;

    Ok(created_response(order))
}
