use chrono::{DateTime, Utc};
use northwind_core::{NewOrder, NewOrderDetail, Order, OrderDetail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /orders/create`. There is no `orderDate`: the server stamps it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub employee_id: Option<i32>,
    pub required_date: Option<DateTime<Utc>>,
    pub ship_via: Option<i32>,
    pub freight: Option<Decimal>,
    pub ship_name: Option<String>,
    pub ship_address: Option<String>,
    pub ship_city: Option<String>,
    pub ship_region: Option<String>,
    pub ship_postal_code: Option<String>,
    pub ship_country: Option<String>,
    #[serde(default)]
    pub order_details: Vec<OrderDetailRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailRequest {
    pub product_id: i32,
    #[serde(default)]
    pub discount: f32,
    pub quantity: i16,
    pub unit_price: Decimal,
}

impl CreateOrderRequest {
    pub fn into_new_order(self, order_date: DateTime<Utc>) -> NewOrder {
        NewOrder {
            customer_id: self.customer_id,
            employee_id: self.employee_id,
            order_date,
            required_date: self.required_date,
            ship_via: self.ship_via,
            freight: self.freight,
            ship_name: self.ship_name,
            ship_address: self.ship_address,
            ship_city: self.ship_city,
            ship_region: self.ship_region,
            ship_postal_code: self.ship_postal_code,
            ship_country: self.ship_country,
            order_details: self.order_details.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderDetailRequest> for NewOrderDetail {
    fn from(req: OrderDetailRequest) -> Self {
        Self {
            product_id: req.product_id,
            unit_price: req.unit_price,
            quantity: req.quantity,
            discount: req.discount,
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i32,
    pub customer_id: String,
    pub employee_id: Option<i32>,
    pub order_date: DateTime<Utc>,
    pub required_date: Option<DateTime<Utc>>,
    pub ship_via: Option<i32>,
    pub freight: Option<Decimal>,
    pub ship_name: Option<String>,
    pub ship_address: Option<String>,
    pub ship_city: Option<String>,
    pub ship_region: Option<String>,
    pub ship_postal_code: Option<String>,
    pub ship_country: Option<String>,
    pub order_details: Vec<OrderDetailResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i16,
    pub unit_price: Decimal,
    pub discount: f32,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            customer_id: order.customer_id,
            employee_id: order.employee_id,
            order_date: order.order_date,
            required_date: order.required_date,
            ship_via: order.ship_via,
            freight: order.freight,
            ship_name: order.ship_name,
            ship_address: order.ship_address,
            ship_city: order.ship_city,
            ship_region: order.ship_region,
            ship_postal_code: order.ship_postal_code,
            ship_country: order.ship_country,
            order_details: order.order_details.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            order_id: detail.order_id,
            product_id: detail.product_id,
            quantity: detail.quantity,
            unit_price: detail.unit_price,
            discount: detail.discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_ignores_order_date() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "customerId": "HANAR",
            "orderDate": "1996-07-08T00:00:00Z",
            "freight": 65.83,
            "shipCountry": "Brazil",
            "orderDetails": [
                { "productId": 14, "quantity": 9, "unitPrice": "18.60", "discount": 0.0 }
            ]
        }))
        .unwrap();

        let stamped = Utc::now();
        let order = req.into_new_order(stamped);

        assert_eq!(order.order_date, stamped);
        assert_eq!(order.freight, Some(Decimal::new(6583, 2)));
        assert_eq!(order.order_details[0].unit_price, Decimal::new(1860, 2));
    }

    #[test]
    fn test_order_details_default_to_empty() {
        let req: CreateOrderRequest = serde_json::from_value(json!({ "customerId": "ALFKI" })).unwrap();
        assert!(req.order_details.is_empty());
        assert!(req.ship_name.is_none());
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = OrderDetailResponse {
            order_id: 10248,
            product_id: 11,
            quantity: 12,
            unit_price: Decimal::new(1400, 2),
            discount: 0.0,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["orderId"], 10248);
        assert_eq!(value["productId"], 11);
        assert_eq!(value["unitPrice"], "14.00");
    }
}
