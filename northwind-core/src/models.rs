use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A customer purchase header as persisted in the `orders` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
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
    pub order_details: Vec<OrderDetail>,
}

/// One line item, keyed by (order_id, product_id).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order_id: i32,
    pub product_id: i32,
    pub unit_price: Decimal,
    pub quantity: i16,
    pub discount: f32,
}

/// An order that has not been inserted yet. The store assigns `order_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
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
    pub order_details: Vec<NewOrderDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderDetail {
    pub product_id: i32,
    pub unit_price: Decimal,
    pub quantity: i16,
    pub discount: f32,
}

impl NewOrderDetail {
    /// Attach the line item to a persisted order
    pub fn into_detail(self, order_id: i32) -> OrderDetail {
        OrderDetail {
            order_id,
            product_id: self.product_id,
            unit_price: self.unit_price,
            quantity: self.quantity,
            discount: self.discount,
        }
    }
}

impl NewOrder {
    /// Materialize the order once the store has generated its id. Details
    /// come back ordered by product id, the same order reads return them in.
    pub fn into_order(self, order_id: i32) -> Order {
        let mut order_details: Vec<OrderDetail> = self
            .order_details
            .into_iter()
            .map(|detail| detail.into_detail(order_id))
            .collect();
        order_details.sort_by_key(|d| d.product_id);

        Order {
            order_id,
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
