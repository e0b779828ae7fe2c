use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use once_cell::sync::OnceCell;
use tokio::sync::RwLock;

use crate::error::{ConfigurationError, ContactFormError, TransportError};

use super::{ConfigResolver, SpamClassifier};

static GLOBAL: OnceCell<Arc<SpamClientCache>> = OnceCell::new();

enum Slot {
    Empty,
    Ready(Arc<dyn SpamClassifier>),
    Failed(ConfigurationError),
    /// Transport failure of resolution number `attempt`. Only callers that
    /// arrived before it settled observe it; later callers resolve again.
    Unreachable {
        attempt: usize,
        error: TransportError,
    },
}

/// Holds one verified classifier client for reuse across submissions.
///
/// The first [`get`](Self::get) resolves credentials and verifies the key;
/// concurrent first callers wait for that single resolution and observe the
/// same client or the same error. A transport failure is shared with the
/// callers that were waiting on that attempt but is not remembered for
/// later ones. [`reset`](Self::reset) empties the slot.
pub struct SpamClientCache {
    resolver: ConfigResolver,
    slot: RwLock<Slot>,
    resolutions: AtomicUsize,
    settled: AtomicUsize,
}

impl SpamClientCache {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self {
            resolver,
            slot: RwLock::new(Slot::Empty),
            resolutions: AtomicUsize::new(0),
            settled: AtomicUsize::new(0),
        }
    }

    /// The process-wide cache. `init` only runs for the first caller; later
    /// callers get the existing cache and their `init` is ignored.
    pub fn global<F>(init: F) -> Arc<Self>
    where
        F: FnOnce() -> ConfigResolver,
    {
        let mut created = false;
        let cache = GLOBAL
            .get_or_init(|| {
                created = true;
                Arc::new(Self::new(init()))
            })
            .clone();
        if !created {
            tracing::warn!(
                target: "akismet",
                "process-wide spam client cache already exists; new resolver settings ignored"
            );
        }
        cache
    }

    pub async fn get(&self) -> Result<Arc<dyn SpamClassifier>, ContactFormError> {
        let settled_on_arrival = self.settled.load(Ordering::SeqCst);
        if let Some(cached) = Self::cached(&*self.slot.read().await) {
            return cached;
        }

        let mut slot = self.slot.write().await;
        if let Some(cached) = Self::cached(&slot) {
            return cached;
        }
        if let Slot::Unreachable { attempt, error } = &*slot {
            if *attempt > settled_on_arrival {
                return Err(error.clone().into());
            }
        }

        let attempt = self.resolutions.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.resolver.resolve().await;
        self.settled.store(attempt, Ordering::SeqCst);
        match outcome {
            Ok(client) => {
                tracing::info!(target: "akismet", blog = %client.config().url, "spam client cached");
                *slot = Slot::Ready(client.clone());
                Ok(client)
            }
            Err(ContactFormError::Configuration(err)) => {
                tracing::error!(target: "akismet", error = %err, "spam client configuration failed");
                *slot = Slot::Failed(err.clone());
                Err(err.into())
            }
            Err(ContactFormError::Transport(err)) => {
                tracing::warn!(target: "akismet", error = %err, attempt, "spam client resolution unreachable");
                *slot = Slot::Unreachable {
                    attempt,
                    error: err.clone(),
                };
                Err(err.into())
            }
            Err(err) => Err(err),
        }
    }

    /// Drops the cached client or failure; the next `get` resolves again.
    pub async fn reset(&self) {
        *self.slot.write().await = Slot::Empty;
        tracing::info!(target: "akismet", "spam client cache cleared");
    }

    /// How many times credentials have been resolved.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    fn cached(slot: &Slot) -> Option<Result<Arc<dyn SpamClassifier>, ContactFormError>> {
        match slot {
            Slot::Empty | Slot::Unreachable { .. } => None,
            Slot::Ready(client) => Some(Ok(client.clone())),
            Slot::Failed(err) => Some(Err(err.clone().into())),
        }
    }
}
