//! # Portfolio Store
//!
//! Reactive mirror of the engine's open documents.
//!
//! ## Overview
//!
//! [`PortfolioStore`] is a shared handle around a [`PortfolioState`] and a
//! list of observers. Every mutation goes through [`PortfolioStore::update`],
//! which applies the change and notifies all observers synchronously, in
//! registration order, before returning. One update's mutation and
//! notifications happen under a single lock, so observers never see a partial
//! state and notifications arrive in the order updates were issued.
//!
//! ## Usage
//!
//! ```ignore
//! use core_portfolio::store::PortfolioStore;
//!
//! let store = PortfolioStore::new();
//! let subscription = store.subscribe(|state| {
//!     println!("{} documents open", state.documents.len());
//! });
//!
//! store.set_unsaved(true);
//! subscription.unsubscribe();
//! ```
//!
//! Observers must not call back into the store; doing so deadlocks.

use bridge_traits::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::warn;

use crate::messages::DocumentDetails;

/// Snapshot of the open documents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioState {
    pub unsaved: bool,
    pub documents: Vec<DocumentDetails>,
    /// Position of the active document in `documents`; `-1` on the wire when none.
    #[serde(with = "active_index")]
    pub active_document_index: Option<usize>,
}

impl PortfolioState {
    /// The active document, if the index still points inside the list.
    pub fn active_document(&self) -> Option<&DocumentDetails> {
        self.active_document_index
            .and_then(|index| self.documents.get(index))
    }
}

mod active_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match index {
            Some(index) => serializer.serialize_i64(*index as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}

type Observer = Box<dyn FnMut(&PortfolioState) + Send>;

struct Inner {
    state: PortfolioState,
    observers: Vec<(u64, Observer)>,
    next_observer_id: u64,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // An observer that panicked leaves the state consistent; keep serving.
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared handle to the document-list state.
///
/// Cloning is cheap; all clones observe and mutate the same state.
#[derive(Clone)]
pub struct PortfolioStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: PortfolioState::default(),
                observers: Vec::new(),
                next_observer_id: 0,
            })),
        }
    }

    /// Register an observer.
    ///
    /// The observer is called immediately with the current state, then once
    /// per subsequent update.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&PortfolioState) + Send + 'static,
    {
        let mut inner = lock(&self.inner);
        let mut observer: Observer = Box::new(observer);
        observer(&inner.state);

        let id = inner.next_observer_id;
        inner.next_observer_id += 1;
        inner.observers.push((id, observer));

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Apply `mutator` and notify every observer before returning.
    pub fn update<F>(&self, mutator: F)
    where
        F: FnOnce(&mut PortfolioState),
    {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        mutator(&mut inner.state);
        for (_, observer) in inner.observers.iter_mut() {
            observer(&inner.state);
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PortfolioState {
        lock(&self.inner).state.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }

    /// Replace the document list verbatim.
    ///
    /// The active index is left untouched even if it no longer points at the
    /// same document; the engine follows up with an active-document update.
    pub fn replace_documents(&self, documents: Vec<DocumentDetails>) {
        self.update(move |state| state.documents = documents);
    }

    /// Point the active index at the first document with `document_id`.
    ///
    /// An id missing from the current list clears the index.
    pub fn set_active_document(&self, document_id: DocumentId) {
        self.update(|state| {
            let index = state
                .documents
                .iter()
                .position(|document| document.id == document_id);

            if index.is_none() {
                warn!(
                    document_id,
                    open_documents = state.documents.len(),
                    "Active document is not in the open documents list"
                );
            }

            state.active_document_index = index;
        });
    }

    pub fn set_unsaved(&self, unsaved: bool) {
        self.update(|state| state.unsaved = unsaved);
    }
}

impl fmt::Debug for PortfolioStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("PortfolioStore")
            .field("state", &inner.state)
            .field("subscriber_count", &inner.observers.len())
            .finish()
    }
}

/// Handle returned by [`PortfolioStore::subscribe`].
///
/// Dropping the handle keeps the observer registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner).observers.retain(|(id, _)| *id != self.id);
        }
    }
}
