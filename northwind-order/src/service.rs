use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use northwind_core::repository::{OrderRepository, Page};
use northwind_core::{CoreError, CoreResult};
use tracing::info;

use crate::models::{CreateOrderRequest, OrderDetailRequest, OrderDetailResponse, OrderResponse};

/// Order CRUD over an explicitly supplied repository handle.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    /// Orders by ascending id; `skip` is applied before `take`.
    pub async fn list(&self, page: Page) -> CoreResult<Vec<OrderResponse>> {
        let orders = self.repo.list_orders(page).await?;
        Ok(orders.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, order_id: i32) -> CoreResult<OrderResponse> {
        self.repo
            .get_order(order_id)
            .await?
            .map(Into::into)
            .ok_or(CoreError::OrderNotFound(order_id))
    }

    /// Persist a new order and its details in one unit. `orderDate` is the
    /// server clock at microsecond precision, matching what the store keeps.
    pub async fn create(&self, req: CreateOrderRequest) -> CoreResult<OrderResponse> {
        let order_date = Utc::now().trunc_subsecs(6);
        let order = self.repo.create_order(req.into_new_order(order_date)).await?;

        info!(
            order_id = order.order_id,
            customer_id = %order.customer_id,
            details = order.order_details.len(),
            "order created"
        );
        Ok(order.into())
    }

    pub async fn add_products_to_order(
        &self,
        order_id: i32,
        details: Vec<OrderDetailRequest>,
    ) -> CoreResult<Vec<OrderDetailResponse>> {
        let details = details.into_iter().map(Into::into).collect();
        let added = self
            .repo
            .add_order_details(order_id, details)
            .await?
            .ok_or(CoreError::OrderNotFound(order_id))?;

        info!(order_id, added = added.len(), "products added to order");
        Ok(added.into_iter().map(Into::into).collect())
    }

    /// Remove the order together with all of its details.
    pub async fn delete(&self, order_id: i32) -> CoreResult<()> {
        if !self.repo.delete_order(order_id).await? {
            return Err(CoreError::OrderNotFound(order_id));
        }

        info!(order_id, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use northwind_store::MemoryOrderRepository;
    use rust_decimal::Decimal;

    fn setup() -> (OrderService, Arc<MemoryOrderRepository>) {
        let repo = Arc::new(MemoryOrderRepository::new());
        (OrderService::new(repo.clone()), repo)
    }

    fn detail(product_id: i32, quantity: i16) -> OrderDetailRequest {
        OrderDetailRequest {
            product_id,
            discount: 0.0,
            quantity,
            unit_price: Decimal::new(1800, 2),
        }
    }

    fn create_request(customer_id: &str, details: Vec<OrderDetailRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: customer_id.to_string(),
            employee_id: Some(4),
            required_date: None,
            ship_via: Some(1),
            freight: Some(Decimal::new(1161, 2)),
            ship_name: Some("Toms Spezialitäten".to_string()),
            ship_address: Some("Luisenstr. 48".to_string()),
            ship_city: Some("Münster".to_string()),
            ship_region: None,
            ship_postal_code: Some("44087".to_string()),
            ship_country: Some("Germany".to_string()),
            order_details: details,
        }
    }

    async fn seed(service: &OrderService, count: usize) {
        for _ in 0..count {
            service.create(create_request("TOMSP", vec![detail(1, 1)])).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_applies_skip_then_take() {
        let (service, _) = setup();
        seed(&service, 5).await;

        let orders = service.list(Page::new(Some(2), Some(2))).await.unwrap();
        let ids: Vec<i32> = orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_list_without_bounds_returns_all_in_id_order() {
        let (service, _) = setup();
        seed(&service, 3).await;

        let orders = service.list(Page::default()).await.unwrap();
        let ids: Vec<i32> = orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(orders.iter().all(|o| o.order_details.len() == 1));
    }

    #[tokio::test]
    async fn test_get_missing_order_is_not_found() {
        let (service, _) = setup();
        seed(&service, 1).await;

        let err = service.get_by_id(2).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderNotFound(2)));
    }

    #[tokio::test]
    async fn test_create_stamps_order_date() {
        let (service, _) = setup();
        let before = Utc::now().trunc_subsecs(6);
        let created = service.create(create_request("TOMSP", Vec::new())).await.unwrap();
        let after = Utc::now();

        assert!(created.order_date >= before);
        assert!(created.order_date <= after);
    }

    #[tokio::test]
    async fn test_create_persists_every_detail() {
        let (service, repo) = setup();
        let details = vec![detail(11, 12), detail(42, 10), detail(72, 5)];
        let created = service.create(create_request("VINET", details)).await.unwrap();

        assert_eq!(repo.detail_count().await, 3);
        assert_eq!(created.order_details.len(), 3);
        assert!(created.order_details.iter().all(|d| d.order_id == created.order_id));
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (service, _) = setup();
        let created = service
            .create(create_request("VINET", vec![detail(42, 10), detail(11, 12)]))
            .await
            .unwrap();

        let fetched = service.get_by_id(created.order_id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_add_products_to_missing_order_writes_nothing() {
        let (service, repo) = setup();

        let err = service
            .add_products_to_order(7, vec![detail(1, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::OrderNotFound(7)));
        assert_eq!(repo.detail_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_products_appends_details() {
        let (service, _) = setup();
        let created = service.create(create_request("VINET", vec![detail(11, 12)])).await.unwrap();

        let added = service
            .add_products_to_order(created.order_id, vec![detail(14, 9), detail(51, 40)])
            .await
            .unwrap();

        assert_eq!(added.len(), 2);
        assert!(added.iter().all(|d| d.order_id == created.order_id));

        let fetched = service.get_by_id(created.order_id).await.unwrap();
        let products: Vec<i32> = fetched.order_details.iter().map(|d| d.product_id).collect();
        assert_eq!(products, vec![11, 14, 51]);
    }

    #[tokio::test]
    async fn test_delete_removes_order_and_details() {
        let (service, repo) = setup();
        let created = service
            .create(create_request("VINET", vec![detail(1, 1), detail(2, 2), detail(3, 3)]))
            .await
            .unwrap();

        service.delete(created.order_id).await.unwrap();

        assert_eq!(repo.detail_count().await, 0);
        assert!(matches!(
            service.get_by_id(created.order_id).await,
            Err(CoreError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_order_is_not_found() {
        let (service, _) = setup();
        let err = service.delete(10248).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderNotFound(10248)));
    }
}
