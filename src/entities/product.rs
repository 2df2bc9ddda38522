use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog product
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub original_price: Option<Decimal>,
    pub discount_percent: i32,
    #[sea_orm(nullable)]
    pub category_id: Option<Uuid>,
    /// Never negative; only order placement decrements it
    pub stock: i32,
    #[sea_orm(column_type = "Decimal(Some((3, 2)))")]
    pub rating: Decimal,
    pub review_count: i32,
    #[sea_orm(nullable)]
    pub brand: Option<String>,
    /// Ordered list of image URLs
    #[sea_orm(column_type = "Json")]
    pub images: Json,
    /// Free-form key/value specification sheet
    #[sea_orm(column_type = "Json")]
    pub specifications: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::wishlist_item::Entity")]
    WishlistItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::wishlist_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishlistItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
