use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use crate::domain::{InsufficientStockItem, OrderItem, ProcessOrderResponse, StockUpdate};
use super::{OrderError, ProductStore, StoreSession};

pub const EMPTY_ORDER_MESSAGE: &str = "Items array is required and cannot be empty";

/// Applies orders to a [`ProductStore`] all-or-nothing.
#[derive(Clone)]
pub struct OrderStockReducer<S> {
    store: S,
    timeout: Duration,
}

impl<S: ProductStore> OrderStockReducer<S> {
    /// `timeout` bounds one whole order, from opening the transaction to commit.
    pub fn new(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn process_order(&self, items: &[OrderItem]) -> ProcessOrderResponse {
        match self.try_process_order(items).await {
            Ok(updates) => ProcessOrderResponse::fulfilled(updates),
            Err(e) => e.into(),
        }
    }

    #[instrument(name = "process_order", skip(self, items), fields(items = items.len()))]
    pub async fn try_process_order(&self, items: &[OrderItem]) -> Result<Vec<StockUpdate>, OrderError> {
        let result = match validate_items(items) {
            Ok(()) => self.reduce_within_deadline(items).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(updates) => info!(updated = updates.len(), "Stock reduced for all items"),
            Err(e) => warn!(error = %e, "Order aborted"),
        }
        result
    }

    async fn reduce_within_deadline(&self, items: &[OrderItem]) -> Result<Vec<StockUpdate>, OrderError> {
        let mut shortages = Vec::new();
        let outcome = tokio::time::timeout(self.timeout, self.reduce(items, &mut shortages)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => Err(abort(&mut shortages, OrderError::Timeout(self.timeout))),
        }
    }

    /// Runs both phases in one session. Any early return drops the session,
    /// which rolls back whatever was staged.
    ///
    /// Shortages are collected into `shortages` so they outlive a cancelled scan.
    async fn reduce(
        &self,
        items: &[OrderItem],
        shortages: &mut Vec<InsufficientStockItem>,
    ) -> Result<Vec<StockUpdate>, OrderError> {
        let mut session = self.store.begin().await?;
        let updates = check_stock(&mut session, items, shortages).await?;
        apply_updates(&mut session, &updates).await?;
        session.commit().await?;
        Ok(updates)
    }
}

fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::ValidationError(EMPTY_ORDER_MESSAGE.to_string()));
    }
    match items.iter().find(|item| item.quantity <= 0) {
        Some(item) => Err(OrderError::ValidationError(format!(
            "invalid quantity: {} for product {}",
            item.quantity, item.product_id
        ))),
        None => Ok(()),
    }
}

async fn check_stock<S: StoreSession>(
    session: &mut S,
    items: &[OrderItem],
    shortages: &mut Vec<InsufficientStockItem>,
) -> Result<Vec<StockUpdate>, OrderError> {
    let mut updates = Vec::with_capacity(items.len());

    for item in items {
        let product = match session.find_by_id(&item.product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => return Err(abort(shortages, OrderError::NotFound(item.product_id.clone()))),
            Err(e) => return Err(abort(shortages, e.into())),
        };

        match StockUpdate::plan(&product, item.quantity) {
            Ok(update) => updates.push(update),
            Err(shortage) => {
                debug!(
                    product_id = %shortage.product_id,
                    requested = shortage.requested_quantity,
                    available = shortage.available_stock,
                    "Insufficient stock"
                );
                shortages.push(shortage);
            }
        }
    }

    if !shortages.is_empty() {
        return Err(OrderError::InsufficientStock(std::mem::take(shortages)));
    }
    Ok(updates)
}

/// Shortages already found take precedence over whatever stopped the scan,
/// including the deadline.
fn abort(shortages: &mut Vec<InsufficientStockItem>, cause: OrderError) -> OrderError {
    if shortages.is_empty() {
        cause
    } else {
        debug!(cause = %cause, "Scan stopped after shortages were found");
        OrderError::InsufficientStock(std::mem::take(shortages))
    }
}

async fn apply_updates<S: StoreSession>(session: &mut S, updates: &[StockUpdate]) -> Result<(), OrderError> {
    for update in updates {
        let matched = session.decrement_stock(&update.product_id, update.reduced_quantity).await?;
        if matched == 0 {
            return Err(OrderError::ConsistencyError(update.product_id.clone()));
        }
        debug!(product_id = %update.product_id, new_stock = update.new_stock, "Decrement staged");
    }
    Ok(())
}
