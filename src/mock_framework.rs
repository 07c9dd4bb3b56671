//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_begin`] or [`expect_tx_action`] to assert behavior.

use crate::actor_framework::{Entity, Response, ResourceClient, ResourceRequest, TxGrant, TxId};
use tokio::sync::{mpsc, oneshot};

/// Creates a mock client and a receiver for asserting requests.
///
/// The test plays the actor: it inspects each request arriving on `receiver`
/// and answers through the embedded responder, which makes success, failure
/// and stalls deterministic.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Answers a Begin request with transaction `id`. The returned receiver
/// resolves (with an error) once the client releases the transaction.
pub fn grant(respond_to: Response<TxGrant>, id: TxId) -> oneshot::Receiver<()> {
    let (lease, released) = oneshot::channel();
    let _ = respond_to.send(Ok(TxGrant { id, lease }));
    released
}

/// Helper to verify that the next message is a Begin request
pub async fn expect_begin<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<Response<TxGrant>> {
    match receiver.recv().await {
        Some(ResourceRequest::Begin { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a transactional Get request
pub async fn expect_tx_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(TxId, T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::TxGet { tx, id, respond_to }) => Some((tx, id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a transactional Action request
pub async fn expect_tx_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(TxId, T::Id, T::Action, Response<Option<T::ActionResult>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::TxAction { tx, id, action, respond_to }) => Some((tx, id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Commit request
pub async fn expect_commit<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(TxId, Response<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Commit { tx, respond_to }) => Some((tx, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ProductClient;
    use crate::domain::{Product, ProductId};
    use crate::stock_reducer::{ProductStore, StoreSession};

    #[tokio::test]
    async fn test_mock_client() {
        let (inner, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let lookup = tokio::spawn(async move {
            let mut session = client.begin().await?;
            session.find_by_id(&ProductId::from("product_1")).await
        });

        let responder = expect_begin(&mut receiver).await.expect("Expected Begin request");
        let _lease = grant(responder, TxId(7));

        let (tx, id, responder) = expect_tx_get(&mut receiver).await.expect("Expected TxGet request");
        assert_eq!(tx, TxId(7));
        assert_eq!(id, ProductId::from("product_1"));
        responder.send(Ok(None)).unwrap();

        assert_eq!(lookup.await.unwrap(), Ok(None));
    }
}
