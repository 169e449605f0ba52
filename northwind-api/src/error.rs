use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use northwind_core::CoreError;
use serde_json::json;

/// Boundary error for every handler. Store failures arrive here unmodified
/// through `?` and leave as a generic 500.
#[derive(Debug)]
pub enum AppError {
    NotFoundError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Anyhow(err) => match err.downcast_ref::<CoreError>() {
                Some(not_found @ CoreError::OrderNotFound(_)) => {
                    (StatusCode::NOT_FOUND, not_found.to_string())
                }
                _ => {
                    tracing::error!("Internal Server Error: {:#}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
                }
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_not_found_maps_to_404() {
        let response = AppError::from(CoreError::OrderNotFound(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_failure_maps_to_500() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "pool timed out");
        let response = AppError::from(CoreError::storage(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_route_not_found() {
        let response = AppError::NotFoundError("No route".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
