use crate::{
    entities::{
        cart_item, order, order::OrderStatus, order_item, product, CartItem, Order, OrderItem,
        Product,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use metrics::counter;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_NUMBER_SUFFIX_LEN: usize = 8;

/// Frozen copy of one purchased product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItemView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub product_price: Decimal,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
}

impl From<order_item::Model> for OrderItemView {
    fn from(model: order_item::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            product_price: model.product_price,
            quantity: model.quantity,
            subtotal: model.subtotal,
        }
    }
}

/// Order together with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    #[schema(value_type = String, example = "confirmed")]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    fn new(order: order::Model, items: Vec<order_item::Model>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            order_number: order.order_number,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            status: order.status,
            created_at: order.created_at,
            items: items.into_iter().map(OrderItemView::from).collect(),
        }
    }
}

/// One cart line priced at the product's current price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

impl PricedLine {
    pub fn new(product_id: Uuid, product_name: String, unit_price: Decimal, quantity: i32) -> Self {
        Self {
            product_id,
            product_name,
            unit_price,
            quantity,
            subtotal: unit_price * Decimal::from(quantity),
        }
    }
}

/// Sum of line subtotals
pub fn order_total(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|line| line.subtotal).sum()
}

/// `ORD-<yyyymmddHHMMSS>-<8 uppercase alphanumerics>`
pub fn generate_order_number<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .map(|_| ORDER_NUMBER_ALPHABET[rng.gen_range(0..ORDER_NUMBER_ALPHABET.len())] as char)
        .collect();

    format!("ORD-{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
}

/// Null, `false`, zero and whitespace-only strings count as no address
pub fn address_is_blank(address: &serde_json::Value) -> bool {
    match address {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(flag) => !flag,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.trim().is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => false,
    }
}

/// Order placement and order history
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Turns the user's cart into a confirmed order.
    ///
    /// Runs as one transaction: the order, its items, the stock decrements and
    /// the cart clear either all commit or none do. Stock is only decremented
    /// while it covers the purchased quantity, so concurrent orders for the last
    /// unit cannot both succeed.
    #[instrument(skip(self, shipping_address))]
    pub async fn place_order(
        &self,
        user_id: Uuid,
        shipping_address: serde_json::Value,
    ) -> Result<OrderView, ServiceError> {
        if address_is_blank(&shipping_address) {
            return Err(ServiceError::ValidationError(
                "Shipping address is required".to_string(),
            ));
        }

        let result = self.place_order_txn(user_id, shipping_address).await;

        match &result {
            Ok(order) => {
                counter!("storefront_orders.placed", 1);
                info!(
                    order_id = %order.id,
                    order_number = %order.order_number,
                    total = %order.total_amount,
                    "Order placed"
                );
            }
            Err(ServiceError::InsufficientStock(msg)) => {
                counter!("storefront_orders.out_of_stock", 1);
                warn!(%msg, "Order rejected");
            }
            Err(ServiceError::ValidationError(_)) => {}
            Err(err) => {
                counter!("storefront_orders.failed", 1);
                error!(error = %err, "Order placement failed");
            }
        }

        result
    }

    async fn place_order_txn(
        &self,
        user_id: Uuid,
        shipping_address: serde_json::Value,
    ) -> Result<OrderView, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .find_also_related(Product)
            .all(&txn)
            .await?;

        if cart.is_empty() {
            return Err(ServiceError::ValidationError("Cart is empty".to_string()));
        }

        let lines = cart
            .into_iter()
            .map(|(item, product)| match product {
                Some(p) => Ok(PricedLine::new(p.id, p.name, p.price, item.quantity)),
                None => Err(ServiceError::ValidationError(
                    "A product in your cart is no longer available".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        // ThreadRng is !Send; keep it out of the awaited statement.
        let order_number = generate_order_number(now, &mut rand::thread_rng());
        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            order_number: Set(order_number),
            total_amount: Set(order_total(&lines)),
            shipping_address: Set(shipping_address),
            status: Set(OrderStatus::Confirmed),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let items: Vec<order_item::Model> = lines
            .iter()
            .map(|line| order_item::Model {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: Some(line.product_id),
                product_name: line.product_name.clone(),
                product_price: line.unit_price,
                quantity: line.quantity,
                subtotal: line.subtotal,
            })
            .collect();

        OrderItem::insert_many(items.iter().map(|item| order_item::ActiveModel {
            id: Set(item.id),
            order_id: Set(item.order_id),
            product_id: Set(item.product_id),
            product_name: Set(item.product_name.clone()),
            product_price: Set(item.product_price),
            quantity: Set(item.quantity),
            subtotal: Set(item.subtotal),
        }))
        .exec(&txn)
        .await?;

        for line in &lines {
            decrement_stock(&txn, line, now).await?;
        }

        CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(OrderView::new(order, items))
    }

    /// The user's orders, newest first, each with its items
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<OrderView>, ServiceError> {
        let orders = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let items = try_join_all(orders.iter().map(|o| self.items_for(o.id))).await?;

        Ok(orders
            .into_iter()
            .zip(items)
            .map(|(order, items)| OrderView::new(order, items))
            .collect())
    }

    /// One of the user's orders with its items
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderView, ServiceError> {
        let order = Order::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let items = self.items_for(order.id).await?;
        Ok(OrderView::new(order, items))
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::ProductName)
            .all(&*self.db)
            .await?)
    }
}

/// `stock = stock - qty` guarded by `stock >= qty`; zero affected rows means sold out.
async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    line: &PricedLine,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(line.quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(now))
        .filter(product::Column::Id.eq(line.product_id))
        .filter(product::Column::Stock.gte(line.quantity))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::InsufficientStock(format!(
            "Insufficient stock for {}",
            line.product_name
        )));
    }
    Ok(())
}
