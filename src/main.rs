mod domain;
mod clients;

mod app_system;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

mod actor_framework;
mod product_actor;
mod stock_reducer;

use tracing::{error, info, Instrument};
use crate::domain::{OrderItem, ProductCreate};
use crate::app_system::{OrderSystem, ReducerConfig, SystemError, setup_tracing};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = ReducerConfig::from_env()?;
    info!("Starting stock reducer demo");

    let system = OrderSystem::new(&config);

    let gift_box = system
        .product_client
        .create_product(ProductCreate::new("Gift Box", "GB-001", 10, 24.99))
        .await?;
    let candle_set = system
        .product_client
        .create_product(ProductCreate::new("Candle Set", "CS-014", 3, 18.50))
        .await?;
    info!(%gift_box, %candle_set, "Products seeded");

    let orders = [
        ("fulfillable", vec![OrderItem::new(gift_box.clone(), 2), OrderItem::new(candle_set.clone(), 1)]),
        ("shortage", vec![OrderItem::new(gift_box.clone(), 1), OrderItem::new(candle_set.clone(), 5)]),
        ("unknown_product", vec![OrderItem::new("product_404", 1)]),
    ];

    for (label, items) in orders {
        let span = tracing::info_span!("order", %label);
        let response = system.reducer.process_order(&items).instrument(span).await;

        if response.success {
            info!(label, updated = response.total_items_updated, "Order fulfilled");
        } else {
            error!(label, message = %response.message, "Order rejected");
        }
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    for id in [gift_box, candle_set] {
        if let Some(product) = system.product_client.get_product(id).await? {
            info!(product = %product.name, stock = product.stock, "Remaining stock");
        }
    }

    system.shutdown().await?;

    info!("Stock reducer demo completed");
    Ok(())
}
