use crate::{
    entities::{category, product, Category, Product},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use strum::{Display, EnumString};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Columns a product listing may be sorted by. Anything else falls back to `id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Id,
    Name,
    Price,
    Rating,
    CreatedAt,
}

impl ProductSort {
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| Self::from_str(s).ok()).unwrap_or_default()
    }

    fn column(self) -> product::Column {
        match self {
            Self::Id => product::Column::Id,
            Self::Name => product::Column::Name,
            Self::Price => product::Column::Price,
            Self::Rating => product::Column::Rating,
            Self::CreatedAt => product::Column::CreatedAt,
        }
    }
}

/// Query string accepted by the product listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Category slug
    pub category: Option<String>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    /// One of id, name, price, rating, created_at
    pub sort: Option<String>,
    /// `DESC` for descending, ascending otherwise
    pub order: Option<String>,
}

impl ProductQuery {
    fn descending(&self) -> bool {
        self.order
            .as_deref()
            .map(|o| o.eq_ignore_ascii_case("desc"))
            .unwrap_or(false)
    }
}

/// Product as shown to shoppers, with its category flattened in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub original_price: Option<Decimal>,
    pub discount_percent: i32,
    pub category_id: Option<Uuid>,
    pub stock: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub review_count: i32,
    pub brand: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub images: serde_json::Value,
    #[schema(value_type = Object)]
    pub specifications: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

impl ProductView {
    pub fn new(product: product::Model, category: Option<category::Model>) -> Self {
        let (category_name, category_slug) = match category {
            Some(c) => (Some(c.name), Some(c.slug)),
            None => (None, None),
        };

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            original_price: product.original_price,
            discount_percent: product.discount_percent,
            category_id: product.category_id,
            stock: product.stock,
            rating: product.rating,
            review_count: product.review_count,
            brand: product.brand,
            images: product.images,
            specifications: product.specifications,
            created_at: product.created_at,
            updated_at: product.updated_at,
            category_name,
            category_slug,
        }
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Read-only access to products and categories
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists products matching the optional category, search and sort filters
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: ProductQuery,
    ) -> Result<Vec<ProductView>, ServiceError> {
        let mut select = Product::find();

        if let Some(slug) = query.category.as_deref().filter(|s| !s.is_empty()) {
            // Several categories may share a slug; match all of them.
            let category_ids: Vec<Uuid> = Category::find()
                .select_only()
                .column(category::Column::Id)
                .filter(category::Column::Slug.eq(slug))
                .into_tuple()
                .all(&*self.db)
                .await?;

            if category_ids.is_empty() {
                debug!(slug, "unknown category slug, not filtering");
            } else {
                select = select.filter(product::Column::CategoryId.is_in(category_ids));
            }
        }

        if let Some(term) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(term);
            let name = Func::lower(Expr::col((product::Entity, product::Column::Name)));
            let description =
                Func::lower(Expr::col((product::Entity, product::Column::Description)));
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(name).like(LikeExpr::new(pattern.clone()).escape('\\')))
                    .add(Expr::expr(description).like(LikeExpr::new(pattern).escape('\\'))),
            );
        }

        let column = ProductSort::parse(query.sort.as_deref()).column();
        select = if query.descending() {
            select.order_by_desc(column)
        } else {
            select.order_by_asc(column)
        };

        let rows = select.find_also_related(Category).all(&*self.db).await?;

        Ok(rows
            .into_iter()
            .map(|(product, category)| ProductView::new(product, category))
            .collect())
    }

    /// Fetches one product with its category name and slug
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductView, ServiceError> {
        let (product, category) = Product::find_by_id(id)
            .find_also_related(Category)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        Ok(ProductView::new(product, category))
    }

    /// All categories ordered by name
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }
}
