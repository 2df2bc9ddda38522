pub mod auth;
pub mod cart;
pub mod categories;
pub mod common;
pub mod orders;
pub mod products;
pub mod wishlist;

use crate::{
    auth::AuthService,
    db::DbPool,
    services::{AccountService, CartService, CatalogService, OrderService, WishlistService},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub wishlist: Arc<WishlistService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, auth_service: Arc<AuthService>) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(db_pool.clone(), auth_service.clone())),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            cart: Arc::new(CartService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone())),
            wishlist: Arc::new(WishlistService::new(db_pool)),
            auth: auth_service,
        }
    }
}
