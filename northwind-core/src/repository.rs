use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{NewOrder, NewOrderDetail, Order, OrderDetail};
use crate::CoreResult;

/// Pagination window: skip first, then take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl Page {
    pub fn new(skip: Option<u32>, take: Option<u32>) -> Self {
        Self { skip, take }
    }

    /// SQL `OFFSET` value
    pub fn offset(&self) -> i64 {
        i64::from(self.skip.unwrap_or(0))
    }

    /// SQL `LIMIT` value; `None` binds as `LIMIT NULL` (no limit)
    pub fn limit(&self) -> Option<i64> {
        self.take.map(i64::from)
    }

    pub fn apply<I: Iterator>(&self, iter: I) -> impl Iterator<Item = I::Item> {
        iter.skip(self.skip.unwrap_or(0) as usize)
            .take(self.take.map_or(usize::MAX, |t| t as usize))
    }
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Orders by ascending id, with their details, windowed by `page`.
    async fn list_orders(&self, page: Page) -> CoreResult<Vec<Order>>;

    async fn get_order(&self, order_id: i32) -> CoreResult<Option<Order>>;

    /// Insert the order and all of its details atomically.
    async fn create_order(&self, order: NewOrder) -> CoreResult<Order>;

    /// Append details to an existing order atomically. `None` means the order
    /// does not exist and nothing was written.
    async fn add_order_details(
        &self,
        order_id: i32,
        details: Vec<NewOrderDetail>,
    ) -> CoreResult<Option<Vec<OrderDetail>>>;

    /// Remove the order and its details atomically. `false` means the order
    /// does not exist.
    async fn delete_order(&self, order_id: i32) -> CoreResult<bool>;
}
