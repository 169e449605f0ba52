pub mod models;
pub mod repository;

pub use models::{NewOrder, NewOrderDetail, Order, OrderDetail};
pub use repository::{OrderRepository, Page};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Order {0} not found")]
    OrderNotFound(i32),
    #[error("Storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "db down");
        let err = CoreError::storage(io);

        assert_eq!(err.to_string(), "Storage failure: db down");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(CoreError::OrderNotFound(10248).to_string(), "Order 10248 not found");
    }
}
