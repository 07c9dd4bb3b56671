#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::actor_framework::TxId;
    use crate::clients::ProductClient;
    use crate::domain::{OrderItem, Product, ProductId, ProductStatus};
    use crate::mock_framework::{create_mock_client, expect_begin, expect_commit, expect_tx_action, expect_tx_get, grant};
    use crate::product_actor::{ProductAction, ProductActionResult};
    use crate::stock_reducer::{OrderError, OrderStockReducer};

    fn product(id: &str, name: &str, stock: u32) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            sku: format!("SKU-{}", id),
            stock,
            price: 10.0,
            status: ProductStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_order_reduction_flow() {
        // 1. Setup Mocks
        let (inner, mut product_rx) = create_mock_client::<Product>(10);
        let reducer = OrderStockReducer::new(ProductClient::new(inner), Duration::from_secs(5));

        // 2. Execute the order in background
        let order_task = tokio::spawn(async move {
            let items = [OrderItem::new("product_1", 2), OrderItem::new("product_2", 5)];
            reducer.process_order(&items).await
        });

        // 3. Verify Interactions

        // Transaction is opened before any read
        let responder = expect_begin(&mut product_rx).await.expect("Expected Begin");
        let lease = grant(responder, TxId(1));

        // Validation reads, in item order
        for (id, name, stock) in [("product_1", "Gift Box", 10), ("product_2", "Candle Set", 5)] {
            let (tx, requested, responder) = expect_tx_get(&mut product_rx).await.expect("Expected TxGet");
            assert_eq!(tx, TxId(1));
            assert_eq!(requested, ProductId::from(id));
            responder.send(Ok(Some(product(id, name, stock)))).unwrap();
        }

        // Decrements, in item order
        for (id, quantity, remaining) in [("product_1", 2, 8), ("product_2", 5, 0)] {
            let (tx, target, action, responder) = expect_tx_action(&mut product_rx).await.expect("Expected TxAction");
            assert_eq!(tx, TxId(1));
            assert_eq!(target, ProductId::from(id));
            assert_eq!(action, ProductAction::DecrementStock(quantity));
            responder.send(Ok(Some(ProductActionResult::Decremented { remaining }))).unwrap();
        }

        let (tx, responder) = expect_commit(&mut product_rx).await.expect("Expected Commit");
        assert_eq!(tx, TxId(1));
        responder.send(Ok(())).unwrap();

        // 4. Verify Result
        let response = order_task.await.unwrap();
        assert!(response.success);
        assert_eq!(response.total_items_updated, 2);
        assert_eq!(response.updated_items[1].product_name, "Candle Set");
        assert_eq!(response.updated_items[1].new_stock, 0);
        assert!(lease.await.is_err());
    }

    #[tokio::test]
    async fn test_shortage_never_writes_or_commits() {
        let (inner, mut product_rx) = create_mock_client::<Product>(10);
        let reducer = OrderStockReducer::new(ProductClient::new(inner), Duration::from_secs(5));

        let order_task = tokio::spawn(async move {
            let items = [OrderItem::new("product_1", 1), OrderItem::new("product_2", 9)];
            reducer.try_process_order(&items).await
        });

        let responder = expect_begin(&mut product_rx).await.expect("Expected Begin");
        let lease = grant(responder, TxId(3));

        let (_, _, responder) = expect_tx_get(&mut product_rx).await.expect("Expected TxGet");
        responder.send(Ok(Some(product("product_1", "Gift Box", 10)))).unwrap();
        let (_, _, responder) = expect_tx_get(&mut product_rx).await.expect("Expected TxGet");
        responder.send(Ok(Some(product("product_2", "Candle Set", 2)))).unwrap();

        let result = order_task.await.unwrap();
        let Err(OrderError::InsufficientStock(shortages)) = &result else {
            panic!("expected shortage, got {:?}", result);
        };
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].requested_quantity, 9);
        assert_eq!(shortages[0].available_stock, 2);

        // The transaction was released without any write or commit.
        assert!(lease.await.is_err());
        assert!(product_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missed_decrement_aborts_before_commit() {
        let (inner, mut product_rx) = create_mock_client::<Product>(10);
        let reducer = OrderStockReducer::new(ProductClient::new(inner), Duration::from_secs(5));

        let order_task = tokio::spawn(async move {
            reducer.try_process_order(&[OrderItem::new("product_1", 1)]).await
        });

        let responder = expect_begin(&mut product_rx).await.expect("Expected Begin");
        let lease = grant(responder, TxId(4));
        let (_, _, responder) = expect_tx_get(&mut product_rx).await.expect("Expected TxGet");
        responder.send(Ok(Some(product("product_1", "Gift Box", 3)))).unwrap();
        let (_, _, _, responder) = expect_tx_action(&mut product_rx).await.expect("Expected TxAction");
        responder.send(Ok(None)).unwrap();

        assert_eq!(
            order_task.await.unwrap(),
            Err(OrderError::ConsistencyError(ProductId::from("product_1")))
        );
        assert!(lease.await.is_err());
        assert!(product_rx.try_recv().is_err());
    }
}
