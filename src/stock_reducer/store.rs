use async_trait::async_trait;
use thiserror::Error;
use crate::domain::{Product, ProductId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Write conflict on product {0}")]
    Conflict(String),
    #[error("Store rejected operation: {0}")]
    Rejected(String),
    #[error("Transaction {0} was aborted")]
    Aborted(String),
}

/// Source of product records that supports atomic read-modify-write.
#[async_trait]
pub trait ProductStore: Send + Sync {
    type Session: StoreSession;

    /// Opens a unit of work. Nothing done through the session is visible to
    /// others until [`StoreSession::commit`]; dropping it rolls back.
    async fn begin(&self) -> Result<Self::Session, StoreError>;
}

#[async_trait]
pub trait StoreSession: Send {
    async fn find_by_id(&mut self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Returns how many records matched `id` (0 or 1).
    async fn decrement_stock(&mut self, id: &ProductId, amount: u32) -> Result<u64, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}
