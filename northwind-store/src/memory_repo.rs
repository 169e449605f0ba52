use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::SubsecRound;
use northwind_core::repository::{OrderRepository, Page};
use northwind_core::{CoreError, CoreResult, NewOrder, NewOrderDetail, Order, OrderDetail};
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::RwLock;

/// Constraint violations the in-memory store reports, mirroring the SQL schema.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("duplicate key: order detail (order_id={order_id}, product_id={product_id}) already exists")]
    DuplicateDetail { order_id: i32, product_id: i32 },
}

struct Tables {
    orders: BTreeMap<i32, Order>,
    next_order_id: i32,
}

/// Process-local order store. Every call validates before mutating, so a
/// rejected call leaves the tables untouched.
pub struct MemoryOrderRepository {
    tables: RwLock<Tables>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                orders: BTreeMap::new(),
                next_order_id: 1,
            }),
        }
    }

    /// Total number of detail rows across all orders
    pub async fn detail_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.orders.values().map(|o| o.order_details.len()).sum()
    }
}

impl Default for MemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// `NUMERIC(10, 2)`: round half away from zero, always two places.
fn stored_decimal(value: Decimal) -> Decimal {
    let mut stored = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    stored.rescale(2);
    stored
}

fn stored_detail(mut detail: NewOrderDetail) -> NewOrderDetail {
    detail.unit_price = stored_decimal(detail.unit_price);
    detail
}

/// Keep values the way the SQL columns would: decimals at scale 2 and
/// timestamps at microsecond precision.
fn stored_order(mut order: NewOrder) -> NewOrder {
    order.order_date = order.order_date.round_subsecs(6);
    order.required_date = order.required_date.map(|d| d.round_subsecs(6));
    order.freight = order.freight.map(stored_decimal);
    order.order_details = order.order_details.into_iter().map(stored_detail).collect();
    order
}

fn check_unique(
    order_id: i32,
    existing: &[OrderDetail],
    incoming: &[NewOrderDetail],
) -> Result<(), MemoryStoreError> {
    let mut seen: HashSet<i32> = existing.iter().map(|d| d.product_id).collect();
    for detail in incoming {
        if !seen.insert(detail.product_id) {
            return Err(MemoryStoreError::DuplicateDetail {
                order_id,
                product_id: detail.product_id,
            });
        }
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn list_orders(&self, page: Page) -> CoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(page.apply(tables.orders.values()).cloned().collect())
    }

    async fn get_order(&self, order_id: i32) -> CoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&order_id).cloned())
    }

    async fn create_order(&self, order: NewOrder) -> CoreResult<Order> {
        let mut tables = self.tables.write().await;
        let order_id = tables.next_order_id;

        check_unique(order_id, &[], &order.order_details).map_err(CoreError::storage)?;

        let order = stored_order(order).into_order(order_id);

        tables.next_order_id += 1;
        tables.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn add_order_details(
        &self,
        order_id: i32,
        details: Vec<NewOrderDetail>,
    ) -> CoreResult<Option<Vec<OrderDetail>>> {
        let mut tables = self.tables.write().await;
        let Some(order) = tables.orders.get_mut(&order_id) else {
            return Ok(None);
        };

        check_unique(order_id, &order.order_details, &details).map_err(CoreError::storage)?;

        let added: Vec<OrderDetail> = details
            .into_iter()
            .map(|d| stored_detail(d).into_detail(order_id))
            .collect();
        order.order_details.extend(added.iter().cloned());
        order.order_details.sort_by_key(|d| d.product_id);

        Ok(Some(added))
    }

    async fn delete_order(&self, order_id: i32) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.remove(&order_id).is_some())
    }
}
