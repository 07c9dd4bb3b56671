use std::time::Duration;
use thiserror::Error;
use crate::domain::{InsufficientStockItem, ProcessOrderResponse, ProductId};
use super::{StoreError, EMPTY_ORDER_MESSAGE};

/// Why an order was not fulfilled.
///
/// No stock was changed, with one exception: a `Timeout` that fires after the
/// store has applied the commit but before its acknowledgement is read.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("{0}")]
    ValidationError(String),
    #[error("product not found: {0}")]
    NotFound(ProductId),
    #[error("insufficient stock for {} items", .0.len())]
    InsufficientStock(Vec<InsufficientStockItem>),
    #[error("product not found during update: {0}")]
    ConsistencyError(ProductId),
    #[error("transaction failed: {0}")]
    TransactionError(#[from] StoreError),
    #[error("order timed out after {0:?}")]
    Timeout(Duration),
}

impl From<OrderError> for ProcessOrderResponse {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InsufficientStock(items) => ProcessOrderResponse::insufficient(items),
            OrderError::ValidationError(message) if message == EMPTY_ORDER_MESSAGE => {
                ProcessOrderResponse::failed(message)
            }
            other => ProcessOrderResponse::failed(format!("Error processing order: {}", other)),
        }
    }
}
