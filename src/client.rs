//! Typed HTTP client for the storefront API.
//!
//! One method per endpoint. Non-2xx responses become [`ClientError::Api`]
//! carrying the `error` field of the body.

use crate::{
    entities::{cart_item, category, wishlist_item},
    errors::ErrorResponse,
    handlers::{
        auth::{LoginRequest, MeResponse, RegisterRequest},
        cart::{AddToCartRequest, UpdateCartItemRequest},
        common::MessageResponse,
        orders::PlaceOrderRequest,
        wishlist::{AddToWishlistRequest, WishlistStatus},
    },
    health::LivenessResponse,
    services::{
        accounts::AuthResponse,
        cart::CartLine,
        catalog::{ProductQuery, ProductView},
        orders::OrderView,
        wishlist::WishlistEntry,
    },
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

/// Makes sure the base URL ends in `/api`.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with("/api") {
        trimmed.to_string()
    } else {
        format!("{}/api", trimmed)
    }
}

#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl StorefrontClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("storefront-client/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "storefront response");

        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }

    // Auth

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = RegisterRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.send(self.request(Method::POST, "/auth/register").json(&body))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.send(self.request(Method::POST, "/auth/login").json(&body))
            .await
    }

    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }

    // Catalog

    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<ProductView>, ClientError> {
        self.send(self.request(Method::GET, "/products").query(query))
            .await
    }

    pub async fn product(&self, id: Uuid) -> Result<ProductView, ClientError> {
        self.send(self.request(Method::GET, &format!("/products/{}", id)))
            .await
    }

    pub async fn categories(&self) -> Result<Vec<category::Model>, ClientError> {
        self.send(self.request(Method::GET, "/categories")).await
    }

    // Cart

    pub async fn cart(&self) -> Result<Vec<CartLine>, ClientError> {
        self.send(self.request(Method::GET, "/cart")).await
    }

    /// Total quantity across the cart, as shown on the cart badge
    pub async fn cart_count(&self) -> Result<i64, ClientError> {
        Ok(self
            .cart()
            .await?
            .iter()
            .map(|line| i64::from(line.quantity))
            .sum())
    }

    pub async fn add_to_cart(
        &self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<cart_item::Model, ClientError> {
        let body = AddToCartRequest {
            product_id: Some(product_id),
            quantity: Some(quantity),
        };
        self.send(self.request(Method::POST, "/cart").json(&body))
            .await
    }

    pub async fn update_cart_item(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<cart_item::Model, ClientError> {
        let body = UpdateCartItemRequest {
            quantity: Some(quantity),
        };
        self.send(
            self.request(Method::PUT, &format!("/cart/{}", item_id))
                .json(&body),
        )
        .await
    }

    pub async fn remove_from_cart(&self, item_id: Uuid) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/cart/{}", item_id)))
            .await
    }

    pub async fn clear_cart(&self) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, "/cart")).await
    }

    // Orders

    pub async fn orders(&self) -> Result<Vec<OrderView>, ClientError> {
        self.send(self.request(Method::GET, "/orders")).await
    }

    pub async fn order(&self, id: Uuid) -> Result<OrderView, ClientError> {
        self.send(self.request(Method::GET, &format!("/orders/{}", id)))
            .await
    }

    pub async fn place_order(
        &self,
        shipping_address: serde_json::Value,
    ) -> Result<OrderView, ClientError> {
        let body = PlaceOrderRequest {
            shipping_address: Some(shipping_address),
        };
        self.send(self.request(Method::POST, "/orders").json(&body))
            .await
    }

    // Wishlist

    pub async fn wishlist(&self) -> Result<Vec<WishlistEntry>, ClientError> {
        self.send(self.request(Method::GET, "/wishlist")).await
    }

    pub async fn add_to_wishlist(
        &self,
        product_id: Uuid,
    ) -> Result<wishlist_item::Model, ClientError> {
        let body = AddToWishlistRequest {
            product_id: Some(product_id),
        };
        self.send(self.request(Method::POST, "/wishlist").json(&body))
            .await
    }

    pub async fn remove_from_wishlist(
        &self,
        item_id: Uuid,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/wishlist/{}", item_id)))
            .await
    }

    pub async fn check_wishlist(&self, product_id: Uuid) -> Result<bool, ClientError> {
        let status: WishlistStatus = self
            .send(
                self.request(Method::GET, "/wishlist/check")
                    .query(&[("product_id", product_id.to_string())]),
            )
            .await?;
        Ok(status.in_wishlist)
    }

    pub async fn health(&self) -> Result<LivenessResponse, ClientError> {
        self.send(self.request(Method::GET, "/health")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:5000", "http://localhost:5000/api")]
    #[case("http://localhost:5000/", "http://localhost:5000/api")]
    #[case("http://localhost:5000/api", "http://localhost:5000/api")]
    #[case("https://shop.example.com/api/", "https://shop.example.com/api")]
    fn base_url_always_ends_in_api(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_base_url(raw), expected);
    }
}
