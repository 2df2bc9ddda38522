use crate::{
    entities::{product, wishlist_item, Product, WishlistItem},
    errors::{is_unique_violation, ServiceError},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product fields shown on a wishlist card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
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
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub review_count: i32,
}

impl From<product::Model> for ProductSummary {
    fn from(p: product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            original_price: p.original_price,
            discount_percent: p.discount_percent,
            images: p.images,
            stock: p.stock,
            brand: p.brand,
            rating: p.rating,
            review_count: p.review_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product: ProductSummary,
}

fn already_in_wishlist() -> ServiceError {
    ServiceError::Conflict("Product already in wishlist".to_string())
}

/// Per-user saved-for-later products
#[derive(Clone)]
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>, ServiceError> {
        let rows = WishlistItem::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .order_by_desc(wishlist_item::Column::CreatedAt)
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, product)| {
                product.map(|p| WishlistEntry {
                    id: item.id,
                    user_id: item.user_id,
                    product_id: item.product_id,
                    created_at: item.created_at,
                    product: p.into(),
                })
            })
            .collect())
    }

    /// Whether the user has saved `product_id`
    #[instrument(skip(self))]
    pub async fn contains(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ServiceError> {
        let count = WishlistItem::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;

        Ok(count > 0)
    }

    /// Saves a product; saving it twice is rejected
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<wishlist_item::Model, ServiceError> {
        if Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("Product not found".to_string()));
        }

        if self.contains(user_id, product_id).await? {
            return Err(already_in_wishlist());
        }

        let row = wishlist_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            created_at: Set(Utc::now()),
        };

        match row.insert(&*self.db).await {
            Ok(item) => {
                info!(wishlist_item_id = %item.id, "Saved product to wishlist");
                Ok(item)
            }
            Err(err) if is_unique_violation(&err) => Err(already_in_wishlist()),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let result = WishlistItem::delete_many()
            .filter(wishlist_item::Column::Id.eq(item_id))
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Wishlist item not found".to_string(),
            ));
        }
        Ok(())
    }
}
