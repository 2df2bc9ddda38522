//! Business logic, one service per storefront resource.
//!
//! Services own the database access and return `ServiceError`; handlers only
//! translate HTTP requests into service calls.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

pub use accounts::AccountService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use wishlist::WishlistService;
