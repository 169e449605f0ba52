use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use northwind_core::repository::{OrderRepository, Page};
use northwind_core::{CoreError, CoreResult, NewOrder, NewOrderDetail, Order, OrderDetail};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

const ORDER_FIELDS: &str = "order_id, customer_id, employee_id, order_date, required_date, ship_via, freight, \
     ship_name, ship_address, ship_city, ship_region, ship_postal_code, ship_country";

const DETAIL_FIELDS: &str = "order_id, product_id, unit_price, quantity, discount";

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: i32,
    customer_id: String,
    employee_id: Option<i32>,
    order_date: DateTime<Utc>,
    required_date: Option<DateTime<Utc>>,
    ship_via: Option<i32>,
    freight: Option<Decimal>,
    ship_name: Option<String>,
    ship_address: Option<String>,
    ship_city: Option<String>,
    ship_region: Option<String>,
    ship_postal_code: Option<String>,
    ship_country: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OrderDetailRow {
    order_id: i32,
    product_id: i32,
    unit_price: Decimal,
    quantity: i16,
    discount: f32,
}

impl OrderRow {
    fn into_order(self, order_details: Vec<OrderDetail>) -> Order {
        Order {
            order_id: self.order_id,
            customer_id: self.customer_id,
            employee_id: self.employee_id,
            order_date: self.order_date,
            required_date: self.required_date,
            ship_via: self.ship_via,
            freight: self.freight,
            ship_name: self.ship_name,
            ship_address: self.ship_address,
            ship_city: self.ship_city,
            ship_region: self.ship_region,
            ship_postal_code: self.ship_postal_code,
            ship_country: self.ship_country,
            order_details,
        }
    }
}

impl From<OrderDetailRow> for OrderDetail {
    fn from(row: OrderDetailRow) -> Self {
        Self {
            order_id: row.order_id,
            product_id: row.product_id,
            unit_price: row.unit_price,
            quantity: row.quantity,
            discount: row.discount,
        }
    }
}

/// Insert one line item and read it back as the store keeps it (NUMERIC scale applied).
async fn insert_detail(
    tx: &mut Transaction<'_, Postgres>,
    order_id: i32,
    detail: &NewOrderDetail,
) -> Result<OrderDetail, sqlx::Error> {
    let row: OrderDetailRow = sqlx::query_as(&format!(
        "INSERT INTO order_details ({DETAIL_FIELDS}) VALUES ($1, $2, $3, $4, $5) RETURNING {DETAIL_FIELDS}"
    ))
    .bind(order_id)
    .bind(detail.product_id)
    .bind(detail.unit_price)
    .bind(detail.quantity)
    .bind(detail.discount)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.into())
}

/// Row lock on the order so a concurrent delete cannot interleave.
async fn lock_order(tx: &mut Transaction<'_, Postgres>, order_id: i32) -> Result<bool, sqlx::Error> {
    let found: Option<i32> = sqlx::query_scalar("SELECT order_id FROM orders WHERE order_id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(found.is_some())
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn list_orders(&self, page: Page) -> CoreResult<Vec<Order>> {
        debug!(skip = ?page.skip, take = ?page.take, "listing orders");

        let rows: Vec<OrderRow> = sqlx::query_as(&format!("SELECT {ORDER_FIELDS} FROM orders ORDER BY order_id LIMIT $1 OFFSET $2"))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(CoreError::storage)?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.order_id).collect();
        let detail_rows: Vec<OrderDetailRow> = sqlx::query_as(&format!(
            "SELECT {DETAIL_FIELDS} FROM order_details WHERE order_id = ANY($1) ORDER BY order_id, product_id"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        let mut details_by_order: HashMap<i32, Vec<OrderDetail>> = HashMap::new();
        for row in detail_rows {
            details_by_order.entry(row.order_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let details = details_by_order.remove(&row.order_id).unwrap_or_default();
                row.into_order(details)
            })
            .collect())
    }

    async fn get_order(&self, order_id: i32) -> CoreResult<Option<Order>> {
        let order_row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {ORDER_FIELDS} FROM orders WHERE order_id = $1"))
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::storage)?;

        let Some(row) = order_row else {
            return Ok(None);
        };

        let detail_rows: Vec<OrderDetailRow> = sqlx::query_as(&format!(
            "SELECT {DETAIL_FIELDS} FROM order_details WHERE order_id = $1 ORDER BY product_id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::storage)?;

        Ok(Some(row.into_order(detail_rows.into_iter().map(Into::into).collect())))
    }

    async fn create_order(&self, order: NewOrder) -> CoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(CoreError::storage)?;

        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO orders (customer_id, employee_id, order_date, required_date, ship_via, freight,
                                ship_name, ship_address, ship_city, ship_region, ship_postal_code, ship_country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ORDER_FIELDS}
            "#
        ))
        .bind(&order.customer_id)
        .bind(order.employee_id)
        .bind(order.order_date)
        .bind(order.required_date)
        .bind(order.ship_via)
        .bind(order.freight)
        .bind(&order.ship_name)
        .bind(&order.ship_address)
        .bind(&order.ship_city)
        .bind(&order.ship_region)
        .bind(&order.ship_postal_code)
        .bind(&order.ship_country)
        .fetch_one(&mut *tx)
        .await
        .map_err(CoreError::storage)?;

        let mut details = Vec::with_capacity(order.order_details.len());
        for detail in &order.order_details {
            details.push(insert_detail(&mut tx, row.order_id, detail).await.map_err(CoreError::storage)?);
        }

        tx.commit().await.map_err(CoreError::storage)?;

        details.sort_by_key(|d| d.product_id);
        Ok(row.into_order(details))
    }

    async fn add_order_details(
        &self,
        order_id: i32,
        details: Vec<NewOrderDetail>,
    ) -> CoreResult<Option<Vec<OrderDetail>>> {
        let mut tx = self.pool.begin().await.map_err(CoreError::storage)?;

        if !lock_order(&mut tx, order_id).await.map_err(CoreError::storage)? {
            return Ok(None);
        }

        let mut added = Vec::with_capacity(details.len());
        for detail in &details {
            added.push(insert_detail(&mut tx, order_id, detail).await.map_err(CoreError::storage)?);
        }

        tx.commit().await.map_err(CoreError::storage)?;

        Ok(Some(added))
    }

    async fn delete_order(&self, order_id: i32) -> CoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(CoreError::storage)?;

        if !lock_order(&mut tx, order_id).await.map_err(CoreError::storage)? {
            return Ok(false);
        }

        let removed = sqlx::query("DELETE FROM order_details WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(CoreError::storage)?;

        sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(CoreError::storage)?;

        tx.commit().await.map_err(CoreError::storage)?;

        debug!(order_id, details = removed.rows_affected(), "order deleted");
        Ok(true)
    }
}
