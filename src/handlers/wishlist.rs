use crate::{
    auth::{AuthRouterExt, AuthUser, OptionalAuthUser},
    entities::wishlist_item,
    errors::{ApiError, ErrorResponse},
    handlers::common::{
        created_response, message_response, parse_id, success_response, JsonBody,
        MessageResponse,
    },
    services::wishlist::WishlistEntry,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// `/check` answers anonymous callers too; the rest require a signed-in user
pub fn wishlist_routes() -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/:id", delete(remove_from_wishlist))
        .with_auth();

    Router::new()
        .route("/check", get(check_wishlist))
        .merge(protected)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddToWishlistRequest {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WishlistCheckQuery {
    pub product_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistStatus {
    #[serde(rename = "inWishlist")]
    pub in_wishlist: bool,
}

/// List the caller's wishlist with product summaries
#[utoipa::path(
    get,
    path = "/api/wishlist",
    tag = "Wishlist",
    responses(
        (status = 200, description = "Wishlist, newest first", body = [WishlistEntry]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_wishlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.services.wishlist.list(user.user_id).await?;
    Ok(success_response(entries))
}

/// Whether a product is on the caller's wishlist; anonymous callers get `false`
#[utoipa::path(
    get,
    path = "/api/wishlist/check",
    tag = "Wishlist",
    params(WishlistCheckQuery),
    responses(
        (status = 200, description = "Presence flag", body = WishlistStatus),
        (status = 400, description = "Product ID is required", body = ErrorResponse),
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn check_wishlist(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(user): OptionalAuthUser,
    Query(query): Query<WishlistCheckQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = user else {
        return Ok(success_response(WishlistStatus { in_wishlist: false }));
    };

    let raw = query
        .product_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Product ID is required".to_string()))?;

    let in_wishlist = match Uuid::parse_str(&raw) {
        Ok(product_id) => {
            state
                .services
                .wishlist
                .contains(user.user_id, product_id)
                .await?
        }
        Err(_) => false,
    };

    Ok(success_response(WishlistStatus { in_wishlist }))
}

/// Save a product to the wishlist
#[utoipa::path(
    post,
    path = "/api/wishlist",
    tag = "Wishlist",
    request_body = AddToWishlistRequest,
    responses(
        (status = 201, description = "Saved", body = wishlist_item::Model),
        (status = 400, description = "Missing id or already saved", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(payload): JsonBody<AddToWishlistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product_id = payload
        .product_id
        .ok_or_else(|| ApiError::BadRequest("Product ID is required".to_string()))?;

    let item = state
        .services
        .wishlist
        .add(user.user_id, product_id)
        .await?;

    Ok(created_response(item))
}

/// Remove a wishlist row
#[utoipa::path(
    delete,
    path = "/api/wishlist/{id}",
    tag = "Wishlist",
    params(("id" = String, Path, description = "Wishlist item id (UUID)")),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 404, description = "Wishlist item not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "Wishlist item not found")?;
    state.services.wishlist.remove(user.user_id, id).await?;
    Ok(message_response("Item removed from wishlist"))
}
