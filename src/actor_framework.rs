use std::collections::{HashMap, VecDeque};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> { Ok(()) }

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Transaction {0} is not active")]
    TransactionNotActive(TxId),
    #[error("Write conflict on {0}")]
    Conflict(String),
}

/// Identifies one transaction granted by a [`ResourceActor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub u64);

impl Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx_{}", self.0)
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Handed to the caller when its transaction becomes active.
///
/// The actor keeps the receiving half of `lease`. Dropping the sender without
/// committing rolls the transaction back.
#[derive(Debug)]
pub struct TxGrant {
    pub id: TxId,
    pub lease: oneshot::Sender<()>,
}

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Begin {
        respond_to: Response<TxGrant>,
    },
    TxGet {
        tx: TxId,
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    /// `None` in the response means no record matched `id`.
    TxAction {
        tx: TxId,
        id: T::Id,
        action: T::Action,
        respond_to: Response<Option<T::ActionResult>>,
    },
    Commit {
        tx: TxId,
        respond_to: Response<()>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

struct Versioned<T> {
    entity: T,
    version: u64,
}

struct Session<T: Entity> {
    id: TxId,
    lease: oneshot::Receiver<()>,
    /// Committed version of every record the transaction touched, `None` if absent.
    observed: HashMap<T::Id, Option<u64>>,
    staged: HashMap<T::Id, T>,
}

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, Versioned<T>>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    next_version: u64,
    next_tx: u64,
    session: Option<Session<T>>,
    waiting: VecDeque<Response<TxGrant>>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            next_version: 1,
            next_tx: 1,
            session: None,
            waiting: VecDeque::new(),
        };
        let client = ResourceClient { sender };
        (actor, client)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = lease_released(&mut self.session) => {
                    if let Some(session) = self.session.take() {
                        warn!(tx = %session.id, staged = session.staged.len(), "Transaction abandoned, rolling back");
                    }
                    self.grant_next();
                }
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle(msg),
                    None => break,
                },
            }
        }
        debug!("Resource actor stopped");
    }

    fn handle(&mut self, msg: ResourceRequest<T>) {
        match msg {
            ResourceRequest::Create { payload, respond_to } => {
                let id = (self.next_id_fn)();
                let result = T::from_create(id, payload).and_then(|mut item| {
                    item.on_create()?;
                    Ok(item)
                });
                match result {
                    Ok(item) => {
                        let id = item.id().clone();
                        self.write(id.clone(), item);
                        let _ = respond_to.send(Ok(id));
                    }
                    Err(e) => { let _ = respond_to.send(Err(FrameworkError::Rejected(e))); }
                }
            }
            ResourceRequest::Get { id, respond_to } => {
                let item = self.store.get(&id).map(|record| record.entity.clone());
                let _ = respond_to.send(Ok(item));
            }
            ResourceRequest::Update { id, patch, respond_to } => {
                let _ = respond_to.send(self.update(id, patch));
            }
            ResourceRequest::Delete { id, respond_to } => {
                let _ = respond_to.send(self.delete(id));
            }
            ResourceRequest::Action { id, action, respond_to } => {
                let _ = respond_to.send(self.act(id, action));
            }
            ResourceRequest::Begin { respond_to } => {
                self.waiting.push_back(respond_to);
                self.grant_next();
            }
            ResourceRequest::TxGet { tx, id, respond_to } => {
                let _ = respond_to.send(self.tx_get(tx, id));
            }
            ResourceRequest::TxAction { tx, id, action, respond_to } => {
                let _ = respond_to.send(self.tx_action(tx, id, action));
            }
            ResourceRequest::Commit { tx, respond_to } => {
                if respond_to.is_closed() {
                    if matches!(&self.session, Some(session) if session.id == tx) {
                        warn!(tx = %tx, "Commit caller went away, rolling back");
                        self.session = None;
                    }
                } else {
                    let _ = respond_to.send(self.commit(tx));
                }
                self.grant_next();
            }
        }
    }

    fn write(&mut self, id: T::Id, entity: T) {
        let version = self.next_version;
        self.next_version += 1;
        self.store.insert(id, Versioned { entity, version });
    }

    fn update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let mut item = self.committed(&id)?;
        item.on_update(patch).map_err(FrameworkError::Rejected)?;
        self.write(id, item.clone());
        Ok(item)
    }

    fn delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let item = self.committed(&id)?;
        item.on_delete().map_err(FrameworkError::Rejected)?;
        self.store.remove(&id);
        Ok(())
    }

    fn act(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let mut item = self.committed(&id)?;
        let result = item.handle_action(action).map_err(FrameworkError::Rejected)?;
        self.write(id, item);
        Ok(result)
    }

    fn committed(&self, id: &T::Id) -> Result<T, FrameworkError> {
        self.store
            .get(id)
            .map(|record| record.entity.clone())
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn grant_next(&mut self) {
        if self.session.is_some() {
            return;
        }
        while let Some(respond_to) = self.waiting.pop_front() {
            let id = TxId(self.next_tx);
            self.next_tx += 1;
            let (lease, lease_rx) = oneshot::channel();
            if respond_to.send(Ok(TxGrant { id, lease })).is_ok() {
                debug!(tx = %id, "Transaction started");
                self.session = Some(Session {
                    id,
                    lease: lease_rx,
                    observed: HashMap::new(),
                    staged: HashMap::new(),
                });
                return;
            }
            debug!(tx = %id, "Caller gave up before transaction start");
        }
    }

    fn tx_get(&mut self, tx: TxId, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let session = active_session(&mut self.session, tx)?;
        let committed = self.store.get(&id);
        session.observed.entry(id.clone()).or_insert(committed.map(|record| record.version));
        Ok(session
            .staged
            .get(&id)
            .cloned()
            .or_else(|| committed.map(|record| record.entity.clone())))
    }

    fn tx_action(
        &mut self,
        tx: TxId,
        id: T::Id,
        action: T::Action,
    ) -> Result<Option<T::ActionResult>, FrameworkError> {
        let session = active_session(&mut self.session, tx)?;
        let committed = self.store.get(&id);
        session.observed.entry(id.clone()).or_insert(committed.map(|record| record.version));
        let current = session
            .staged
            .get(&id)
            .cloned()
            .or_else(|| committed.map(|record| record.entity.clone()));
        let Some(mut item) = current else {
            return Ok(None);
        };
        let result = item.handle_action(action).map_err(FrameworkError::Rejected)?;
        session.staged.insert(id, item);
        Ok(Some(result))
    }

    fn commit(&mut self, tx: TxId) -> Result<(), FrameworkError> {
        let session = match self.session.take() {
            Some(session) if session.id == tx => session,
            other => {
                self.session = other;
                return Err(FrameworkError::TransactionNotActive(tx));
            }
        };

        for (id, seen) in &session.observed {
            let current = self.store.get(id).map(|record| record.version);
            if current != *seen {
                warn!(tx = %tx, item = %id, "Commit conflict, rolling back");
                return Err(FrameworkError::Conflict(id.to_string()));
            }
        }

        let written = session.staged.len();
        for (id, item) in session.staged {
            self.write(id, item);
        }
        debug!(tx = %tx, written, "Transaction committed");
        Ok(())
    }
}

fn active_session<T: Entity>(
    session: &mut Option<Session<T>>,
    tx: TxId,
) -> Result<&mut Session<T>, FrameworkError> {
    match session {
        Some(session) if session.id == tx => Ok(session),
        _ => Err(FrameworkError::TransactionNotActive(tx)),
    }
}

/// Resolves once the holder of the active transaction drops its lease.
async fn lease_released<T: Entity>(session: &mut Option<Session<T>>) {
    match session {
        Some(session) => {
            let _ = (&mut session.lease).await;
        }
        None => std::future::pending::<()>().await,
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

async fn call<T: Entity, R>(
    sender: &mpsc::Sender<ResourceRequest<T>>,
    request: impl FnOnce(Response<R>) -> ResourceRequest<T>,
) -> Result<R, FrameworkError> {
    let (respond_to, response) = oneshot::channel();
    sender.send(request(respond_to)).await.map_err(|_| FrameworkError::ActorClosed)?;
    response.await.map_err(|_| FrameworkError::ActorDropped)?
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        call(&self.sender, |respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        call(&self.sender, |respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        call(&self.sender, |respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        call(&self.sender, |respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        call(&self.sender, |respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    /// Waits until the actor grants a transaction. Only one transaction is
    /// active per actor; later callers queue in arrival order.
    pub async fn begin(&self) -> Result<Transaction<T>, FrameworkError> {
        let grant = call(&self.sender, |respond_to| ResourceRequest::Begin { respond_to }).await?;
        Ok(Transaction {
            id: grant.id,
            sender: self.sender.clone(),
            _lease: grant.lease,
        })
    }
}

/// Handle to an active transaction. Dropping it without calling
/// [`Transaction::commit`] discards every staged write.
pub struct Transaction<T: Entity> {
    id: TxId,
    sender: mpsc::Sender<ResourceRequest<T>>,
    _lease: oneshot::Sender<()>,
}

impl<T: Entity> Transaction<T> {
    pub fn id(&self) -> TxId {
        self.id
    }

    /// Reads `id`, seeing this transaction's own staged writes.
    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let tx = self.id;
        call(&self.sender, |respond_to| ResourceRequest::TxGet { tx, id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<Option<T::ActionResult>, FrameworkError> {
        let tx = self.id;
        call(&self.sender, |respond_to| ResourceRequest::TxAction { tx, id, action, respond_to }).await
    }

    pub async fn commit(self) -> Result<(), FrameworkError> {
        let tx = self.id;
        call(&self.sender, |respond_to| ResourceRequest::Commit { tx, respond_to }).await
    }

    #[allow(dead_code)]
    pub fn rollback(self) {
        debug!(tx = %self.id, "Rolling back transaction");
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================
