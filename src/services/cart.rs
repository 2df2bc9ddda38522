use crate::{
    entities::{cart_item, product, CartItem, Product},
    errors::{is_unique_violation, ServiceError},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Cart row flattened with the product fields the cart page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub original_price: Option<Decimal>,
    pub discount_percent: i32,
    #[schema(value_type = Vec<String>)]
    pub images: serde_json::Value,
    pub stock: i32,
    pub brand: Option<String>,
}

impl CartLine {
    fn new(item: cart_item::Model, product: product::Model) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            product_id: item.product_id,
            quantity: item.quantity,
            created_at: item.created_at,
            updated_at: item.updated_at,
            name: product.name,
            price: product.price,
            original_price: product.original_price,
            discount_percent: product.discount_percent,
            images: product.images,
            stock: product.stock,
            brand: product.brand,
        }
    }
}

/// Outcome of adding a product to the cart
#[derive(Debug, Clone)]
pub struct CartAddition {
    pub item: cart_item::Model,
    /// True when a new row was inserted, false when an existing row grew
    pub created: bool,
}

/// Per-user shopping cart
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists the user's cart, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CartLine>, ServiceError> {
        let rows = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_desc(cart_item::Column::CreatedAt)
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, product)| product.map(|p| CartLine::new(item, p)))
            .collect())
    }

    /// Adds `quantity` of a product, merging into an existing row for the same product
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartAddition, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        if Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("Product not found".to_string()));
        }

        if let Some(item) = self.increment(user_id, product_id, quantity).await? {
            return Ok(CartAddition {
                item,
                created: false,
            });
        }

        let now = Utc::now();
        let row = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match row.insert(&*self.db).await {
            Ok(item) => {
                info!(cart_item_id = %item.id, "Added product to cart");
                Ok(CartAddition {
                    item,
                    created: true,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                // Lost the race to a concurrent add; the row exists now.
                debug!("Cart row created concurrently, incrementing instead");
                let item = self
                    .increment(user_id, product_id, quantity)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::InternalError("cart row vanished during add".to_string())
                    })?;
                Ok(CartAddition {
                    item,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Atomically bumps the quantity of an existing row; `None` when there is no row
    async fn increment(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<cart_item::Model>, ServiceError> {
        let result = CartItem::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).add(quantity),
            )
            .col_expr(cart_item::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?)
    }

    /// Sets the quantity of one of the user's cart rows
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<cart_item::Model, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Valid quantity is required".to_string(),
            ));
        }

        let item = self.owned_item(user_id, item_id).await?;

        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    /// Deletes one of the user's cart rows
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(cart_item_not_found());
        }
        Ok(())
    }

    /// Empties the user's cart, returning how many rows were removed
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to clear cart");
                ServiceError::from(e)
            })?;

        Ok(result.rows_affected)
    }

    async fn owned_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<cart_item::Model, ServiceError> {
        CartItem::find_by_id(item_id)
            .filter(cart_item::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(cart_item_not_found)
    }
}

fn cart_item_not_found() -> ServiceError {
    ServiceError::NotFound("Cart item not found".to_string())
}
