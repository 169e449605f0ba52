pub mod models;
pub mod service;

pub use models::{CreateOrderRequest, OrderDetailRequest, OrderDetailResponse, OrderResponse};
pub use service::OrderService;
