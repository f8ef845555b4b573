// SQLite OrderSnapshotProvider Implementation
//
// Read-only adapter over the order store. The engine never writes to the
// orders or order_items tables.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reportmill_core::domain::{LineItem, OrderId, OrderSnapshot};
use reportmill_core::error::{AppError, Result};
use reportmill_core::port::OrderSnapshotProvider;
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct SqliteOrderSnapshotProvider {
    pool: SqlitePool,
}

impl SqliteOrderSnapshotProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderSnapshotProvider for SqliteOrderSnapshotProvider {
    async fn fetch(&self, order_id: OrderId) -> Result<OrderSnapshot> {
        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, name, created_at FROM orders WHERE id = ?",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT product_name, quantity, unit_price FROM order_items
            WHERE order_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let items = items
            .into_iter()
            .map(ItemRow::into_line_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(OrderSnapshot::new(order.id, order.name, order.created_at, items))
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    name: String,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    product_name: String,
    quantity: i64,
    unit_price: String,
}

impl ItemRow {
    fn into_line_item(self) -> Result<LineItem> {
        let quantity = u32::try_from(self.quantity)
            .map_err(|_| AppError::Database(format!("Corrupt quantity: {}", self.quantity)))?;
        let unit_price = BigDecimal::from_str(&self.unit_price)
            .map_err(|e| AppError::Database(format!("Corrupt unit_price: {}", e)))?;
        Ok(LineItem::new(self.product_name, quantity, unit_price))
    }
}
