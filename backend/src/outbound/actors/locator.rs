//! Single-writer entity workers addressed by key.
//!
//! [`EntityLocator`] maps a key (a user id, a list id) to one worker task.
//! The task opens the entity's private store, applies its migrations, builds
//! the actor and then drains a bounded mailbox one message at a time, so all
//! operations on a key are applied in arrival order. Different keys run
//! concurrently.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::TraceId;
use crate::outbound::persistence::{EmbeddedStore, StoreError, StoreKind, StoreLocation};

/// Reply channel carried inside actor messages.
pub type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

/// Whether a worker keeps draining its mailbox after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep serving messages.
    Continue,
    /// Stop the worker; queued messages are dropped.
    Stop,
}

/// Errors seen by callers of an entity worker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorError {
    /// The worker failed to start (store open or migration failure).
    #[error("entity {key} is unavailable: {message}")]
    Unavailable {
        /// Entity key.
        key: String,
        /// Start failure.
        message: String,
    },
    /// The worker stopped before replying.
    #[error("entity {key} stopped before replying")]
    Stopped {
        /// Entity key.
        key: String,
    },
    /// The store file could not be removed after teardown.
    #[error("failed to remove store for {key}: {message}")]
    Cleanup {
        /// Entity key.
        key: String,
        /// Filesystem failure.
        message: String,
    },
    /// The operation failed inside the worker.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A stateful entity served by an [`EntityLocator`].
#[async_trait]
pub trait Actor: Sized + Send + 'static {
    /// Locator key.
    type Key: Clone + Eq + Hash + Display + Send + Sync + 'static;
    /// Mailbox message type.
    type Message: Send + 'static;
    /// Shared dependencies handed to every instance.
    type Context: Clone + Send + Sync + 'static;

    /// Store kind, selecting migrations and file prefix.
    const KIND: StoreKind;

    /// Build the actor from its freshly migrated store.
    async fn start(
        key: &Self::Key,
        store: EmbeddedStore,
        context: Self::Context,
    ) -> Result<Self, StoreError>;

    /// Handle one message.
    async fn handle(&mut self, message: Self::Message) -> Flow;

    /// Message asking the actor to wipe its state and stop.
    fn teardown(reply: Reply<()>) -> Self::Message;
}

struct Envelope<M> {
    message: M,
    trace_id: Option<TraceId>,
}

/// Cloneable address of one running worker.
pub struct ActorHandle<M> {
    key: String,
    sender: mpsc::Sender<Envelope<M>>,
    failure: Arc<OnceLock<String>>,
}

impl<M> Clone for ActorHandle<M> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            sender: self.sender.clone(),
            failure: Arc::clone(&self.failure),
        }
    }
}

impl<M: Send + 'static> ActorHandle<M> {
    /// Send the message built by `build` and wait for its reply.
    ///
    /// The caller's trace id travels with the message and is restored while
    /// the worker handles it.
    pub async fn ask<T, F>(&self, build: F) -> Result<T, ActorError>
    where
        F: FnOnce(Reply<T>) -> M,
    {
        let (reply, response) = oneshot::channel();
        let envelope = Envelope {
            message: build(reply),
            trace_id: TraceId::current(),
        };
        if self.sender.send(envelope).await.is_err() {
            return Err(self.closed_error());
        }
        match response.await {
            Ok(result) => result.map_err(ActorError::from),
            Err(_) => Err(self.closed_error()),
        }
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn closed_error(&self) -> ActorError {
        match self.failure.get() {
            Some(message) => ActorError::Unavailable {
                key: self.key.clone(),
                message: message.clone(),
            },
            None => ActorError::Stopped {
                key: self.key.clone(),
            },
        }
    }
}

struct Entry<M> {
    handle: ActorHandle<M>,
    task: JoinHandle<()>,
}

/// Maps entity keys to their single worker.
pub struct EntityLocator<A: Actor> {
    location: StoreLocation,
    context: A::Context,
    mailbox_capacity: usize,
    entries: Mutex<HashMap<A::Key, Entry<A::Message>>>,
}

impl<A: Actor> EntityLocator<A> {
    /// Create a locator whose workers keep their stores at `location`.
    pub fn new(location: StoreLocation, context: A::Context, mailbox_capacity: usize) -> Self {
        Self {
            location,
            context,
            mailbox_capacity: mailbox_capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the live worker for `key`, spawning one if none is running.
    pub async fn handle(&self, key: &A::Key) -> ActorHandle<A::Message> {
        let mut entries = self.entries.lock().await;
        self.live_or_spawn(&mut entries, key)
    }

    fn live_or_spawn(
        &self,
        entries: &mut HashMap<A::Key, Entry<A::Message>>,
        key: &A::Key,
    ) -> ActorHandle<A::Message> {
        if let Some(entry) = entries.get(key).filter(|entry| !entry.handle.is_closed()) {
            return entry.handle.clone();
        }
        let entry = self.spawn(key.clone());
        let handle = entry.handle.clone();
        entries.insert(key.clone(), entry);
        handle
    }

    /// Send a message to the worker for `key` and wait for its reply.
    pub async fn ask<T, F>(&self, key: &A::Key, build: F) -> Result<T, ActorError>
    where
        F: FnOnce(Reply<T>) -> A::Message,
    {
        self.handle(key).await.ask(build).await
    }

    /// Like [`Self::ask`], but answers `None` instead of spawning a worker
    /// when `key` has neither a live worker nor a persisted store.
    ///
    /// Read-only lookups go through here so they never create an empty store
    /// for an unknown or destroyed key.
    pub async fn ask_existing<T, F>(&self, key: &A::Key, build: F) -> Result<Option<T>, ActorError>
    where
        F: FnOnce(Reply<T>) -> A::Message,
    {
        let handle = {
            let mut entries = self.entries.lock().await;
            let live = entries
                .get(key)
                .is_some_and(|entry| !entry.handle.is_closed());
            let persisted = live
                || self
                    .location
                    .holds(A::KIND, &key.to_string())
                    .map_err(|err| ActorError::Unavailable {
                        key: key.to_string(),
                        message: err.to_string(),
                    })?;
            if !persisted {
                return Ok(None);
            }
            self.live_or_spawn(&mut entries, key)
        };
        handle.ask(build).await.map(Some)
    }

    /// Tear down the worker for `key`, evict it and remove its store file.
    pub async fn destroy(&self, key: &A::Key) -> Result<(), ActorError> {
        let entry = self.entries.lock().await.remove(key);
        let outcome = match entry {
            Some(Entry { handle, task }) if !handle.is_closed() => {
                let result = handle.ask(A::teardown).await;
                drop(handle);
                if let Err(err) = task.await {
                    warn!(%key, error = %err, "entity worker ended abnormally");
                }
                result
            }
            _ => Ok(()),
        };
        self.location
            .remove(A::KIND, &key.to_string())
            .map_err(|err| ActorError::Cleanup {
                key: key.to_string(),
                message: err.to_string(),
            })?;
        debug!(store = A::KIND.prefix(), %key, "destroyed entity");
        outcome
    }

    fn spawn(&self, key: A::Key) -> Entry<A::Message> {
        let (sender, mailbox) = mpsc::channel(self.mailbox_capacity);
        let failure = Arc::new(OnceLock::new());
        let handle = ActorHandle {
            key: key.to_string(),
            sender,
            failure: Arc::clone(&failure),
        };
        let task = tokio::spawn(run::<A>(
            key,
            self.location.clone(),
            self.context.clone(),
            mailbox,
            failure,
        ));
        Entry { handle, task }
    }
}

async fn run<A: Actor>(
    key: A::Key,
    location: StoreLocation,
    context: A::Context,
    mut mailbox: mpsc::Receiver<Envelope<A::Message>>,
    failure: Arc<OnceLock<String>>,
) {
    let started = match EmbeddedStore::open(&location, A::KIND, &key.to_string()).await {
        Ok(store) => A::start(&key, store, context).await,
        Err(err) => Err(err),
    };
    let mut actor = match started {
        Ok(actor) => actor,
        Err(err) => {
            error!(store = A::KIND.prefix(), %key, error = %err, "entity worker failed to start");
            let _ = failure.set(err.to_string());
            mailbox.close();
            return;
        }
    };
    debug!(store = A::KIND.prefix(), %key, "entity worker started");

    while let Some(Envelope { message, trace_id }) = mailbox.recv().await {
        if TraceId::scope_optional(trace_id, actor.handle(message)).await == Flow::Stop {
            break;
        }
    }
    debug!(store = A::KIND.prefix(), %key, "entity worker stopped");
}
