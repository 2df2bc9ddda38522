use crate::{
    auth::AuthUser,
    entities::cart_item,
    errors::{ApiError, ErrorResponse},
    handlers::common::{
        created_response, message_response, parse_id, success_response, validate_input, JsonBody,
        MessageResponse,
    },
    services::cart::CartLine,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Cart routes; every one requires a signed-in user
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_cart).post(add_to_cart).delete(clear_cart))
        .route("/:id", put(update_cart_item).delete(remove_cart_item))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Option<Uuid>,
    /// Defaults to 1
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, message = "Valid quantity is required"))]
    pub quantity: Option<i32>,
}

/// List the caller's cart
#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart rows, newest first", body = [CartLine]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_cart(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state.services.cart.list(user.user_id).await?;
    Ok(success_response(lines))
}

/// Add a product, merging with an existing row for it
#[utoipa::path(
    post,
    path = "/api/cart",
    tag = "Cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Existing row incremented", body = cart_item::Model),
        (status = 201, description = "New row created", body = cart_item::Model),
        (status = 400, description = "Missing product id or bad quantity", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(payload): JsonBody<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product_id = payload
        .product_id
        .ok_or_else(|| ApiError::BadRequest("Product ID is required".to_string()))?;
    validate_input(&payload)?;

    let addition = state
        .services
        .cart
        .add_item(user.user_id, product_id, payload.quantity.unwrap_or(1))
        .await?;

    Ok(if addition.created {
        created_response(addition.item)
    } else {
        success_response(addition.item)
    })
}

/// Set the quantity of a cart row
#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    tag = "Cart",
    params(("id" = String, Path, description = "Cart item id (UUID)")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated row", body = cart_item::Model),
        (status = 400, description = "Valid quantity is required", body = ErrorResponse),
        (status = 404, description = "Cart item not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let quantity = payload
        .quantity
        .ok_or_else(|| ApiError::BadRequest("Valid quantity is required".to_string()))?;
    let id = parse_id(&id, "Cart item not found")?;

    let item = state
        .services
        .cart
        .update_quantity(user.user_id, id, quantity)
        .await?;

    Ok(success_response(item))
}

/// Remove one row from the cart
#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    tag = "Cart",
    params(("id" = String, Path, description = "Cart item id (UUID)")),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 404, description = "Cart item not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "Cart item not found")?;
    state.services.cart.remove_item(user.user_id, id).await?;
    Ok(message_response("Item removed from cart"))
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    tag = "Cart",
    responses(
        (status = 200, description = "Cart cleared", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state.services.cart.clear(user.user_id).await?;
    Ok(message_response("Cart cleared"))
}
