use tracing::{error, info};
use crate::clients::ProductClient;
use crate::product_actor;
use crate::stock_reducer::OrderStockReducer;
use super::{ReducerConfig, SystemError};

/// Owns the product actor and hands out the reducer built on top of it.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub product_client: ProductClient,
    pub reducer: OrderStockReducer<ProductClient>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new(config: &ReducerConfig) -> Self {
        let (product_actor, product_client) = product_actor::new(config.store_buffer);
        let product_handle = tokio::spawn(product_actor.run());

        let reducer = OrderStockReducer::new(product_client.clone(), config.timeout);
        info!(timeout = ?config.timeout, store_buffer = config.store_buffer, "Order system started");

        Self {
            product_client,
            reducer,
            handles: vec![product_handle],
        }
    }

    /// Drops every client (closing the actor channels) and waits for the actors to stop.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        let Self { product_client, reducer, handles } = self;
        drop(reducer);
        drop(product_client);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItem, ProductCreate};

    #[tokio::test]
    async fn test_system_processes_order_and_shuts_down() {
        let system = OrderSystem::new(&ReducerConfig::default());
        let id = system
            .product_client
            .create_product(ProductCreate::new("Gift Box", "GB-001", 10, 24.99))
            .await
            .unwrap();

        let response = system.reducer.process_order(&[OrderItem::new(id.clone(), 3)]).await;
        assert!(response.success);
        assert_eq!(system.product_client.check_stock(id).await, Ok(7));

        system.shutdown().await.unwrap();
    }
}
