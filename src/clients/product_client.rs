use async_trait::async_trait;
use tracing::{debug, instrument};
use crate::actor_framework::{FrameworkError, ResourceClient, Transaction};
use crate::domain::{Product, ProductCreate, ProductId, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use crate::stock_reducer::{ProductStore, StoreError, StoreSession};

/// Client for interacting with the Product actor.
///
/// Also serves as the [`ProductStore`] behind the order stock reducer.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, product), fields(name = %product.name, sku = %product.sku))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        Ok(self.inner.create(product).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, ProductError> {
        debug!("Sending request");
        Ok(self.inner.get(id).await?)
    }

    #[instrument(skip(self))]
    #[allow(dead_code)]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    #[allow(dead_code)]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ProductError> {
        debug!("Sending request");
        Ok(self.inner.delete(id).await?)
    }

    #[instrument(skip(self))]
    #[allow(dead_code)]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            other => Err(ProductError::UnexpectedResult(format!("{:?}", other))),
        }
    }
}

/// A product transaction held open by the order stock reducer.
pub struct ProductSession {
    tx: Transaction<Product>,
}

#[async_trait]
impl ProductStore for ProductClient {
    type Session = ProductSession;

    #[instrument(skip(self))]
    async fn begin(&self) -> Result<ProductSession, StoreError> {
        let tx = self.inner.begin().await?;
        debug!(tx = %tx.id(), "Transaction granted");
        Ok(ProductSession { tx })
    }
}

#[async_trait]
impl StoreSession for ProductSession {
    async fn find_by_id(&mut self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.tx.get(id.clone()).await?)
    }

    async fn decrement_stock(&mut self, id: &ProductId, amount: u32) -> Result<u64, StoreError> {
        match self.tx.perform_action(id.clone(), ProductAction::DecrementStock(amount)).await? {
            Some(ProductActionResult::Decremented { .. }) => Ok(1),
            Some(other) => Err(StoreError::Rejected(format!("unexpected result {:?}", other))),
            None => Ok(0),
        }
    }

    async fn commit(self) -> Result<(), StoreError> {
        let tx = self.tx.id();
        self.tx.commit().await?;
        debug!(tx = %tx, "Transaction committed");
        Ok(())
    }
}

impl From<FrameworkError> for StoreError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Conflict(id) => StoreError::Conflict(id),
            FrameworkError::Rejected(reason) => StoreError::Rejected(reason),
            FrameworkError::TransactionNotActive(tx) => StoreError::Aborted(tx.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
