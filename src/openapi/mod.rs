use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront API

Backend for an online store: product catalog, categories, shopping cart,
wishlist, orders and customer accounts.

## Authentication

Register or log in to receive a bearer token, then send it on protected routes:

```
Authorization: Bearer <your-jwt-token>
```

## Errors

Every error response has the same shape:

```json
{ "error": "Product not found" }
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Product categories"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Order placement and history"),
        (name = "Wishlist", description = "Saved products"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::categories::list_categories,

        crate::handlers::cart::list_cart,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::update_cart_item,
        crate::handlers::cart::remove_cart_item,
        crate::handlers::cart::clear_cart,

        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::place_order,

        crate::handlers::wishlist::list_wishlist,
        crate::handlers::wishlist::check_wishlist,
        crate::handlers::wishlist::add_to_wishlist,
        crate::handlers::wishlist::remove_from_wishlist,

        crate::health::liveness,
        crate::health::readiness,
    ),
    components(
        schemas(
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::MeResponse,
            crate::services::accounts::AuthResponse,
            crate::services::accounts::UserSummary,
            crate::services::accounts::UserProfile,

            crate::services::catalog::ProductView,
            crate::entities::category::Model,

            crate::handlers::cart::AddToCartRequest,
            crate::handlers::cart::UpdateCartItemRequest,
            crate::services::cart::CartLine,
            crate::entities::cart_item::Model,

            crate::handlers::orders::PlaceOrderRequest,
            crate::services::orders::OrderView,
            crate::services::orders::OrderItemView,

            crate::handlers::wishlist::AddToWishlistRequest,
            crate::handlers::wishlist::WishlistStatus,
            crate::services::wishlist::WishlistEntry,
            crate::services::wishlist::ProductSummary,
            crate::entities::wishlist_item::Model,

            crate::handlers::common::MessageResponse,
            crate::health::LivenessResponse,
            crate::health::ReadinessResponse,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
