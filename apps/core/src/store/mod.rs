//! Entity stores: single source of truth for each collection.
//!
//! The shared contract, implemented by every store in this module:
//! load replaces the collection wholesale; update and delete mutate the
//! in-memory collection first and roll back to a snapshot when the network
//! call fails; create waits for the server-assigned id. The UI is never
//! left showing a change that did not persist.

use parking_lot::RwLock;
use uuid::Uuid;

pub mod applications;
pub mod companies;
pub mod documents;

pub use applications::{ApplicationFilters, ApplicationMetrics, ApplicationStore};
pub use companies::{CompanyFilters, CompanyStore};
pub use documents::{DocumentStore, StorageUsage};

pub trait Identified {
    fn id(&self) -> Uuid;
}

impl Identified for crate::models::application::JobApplication {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identified for crate::models::company::Company {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identified for crate::models::document::Document {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug)]
struct CollectionState<E> {
    items: Vec<E>,
    is_loading: bool,
    error: Option<String>,
    selected_id: Option<Uuid>,
}

impl<E> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
            selected_id: None,
        }
    }
}

/// Reactive collection holder shared by the concrete stores. Owns the
/// items exclusively; every read hands out clones, so callers can never
/// mutate the collection behind the store's back.
pub struct StoreCore<E> {
    state: RwLock<CollectionState<E>>,
}

impl<E: Identified + Clone> StoreCore<E> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CollectionState::default()),
        }
    }

    pub fn items(&self) -> Vec<E> {
        self.state.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.state.read().selected_id
    }

    pub fn get(&self, id: Uuid) -> Option<E> {
        self.state.read().items.iter().find(|e| e.id() == id).cloned()
    }

    /// Pre-mutation snapshot for optimistic rollback.
    pub fn snapshot(&self) -> Vec<E> {
        self.state.read().items.clone()
    }

    /// Restores a snapshot verbatim.
    pub fn restore(&self, snapshot: Vec<E>) {
        self.state.write().items = snapshot;
    }

    pub fn replace(&self, items: Vec<E>) {
        self.state.write().items = items;
    }

    pub fn push(&self, item: E) {
        self.state.write().items.push(item);
    }

    /// Applies `mutate` to the matching item. Returns false when no item
    /// has that id (nothing is touched).
    pub fn apply(&self, id: Uuid, mutate: impl FnOnce(&mut E)) -> bool {
        let mut state = self.state.write();
        match state.items.iter_mut().find(|e| e.id() == id) {
            Some(item) => {
                mutate(item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut state = self.state.write();
        let before = state.items.len();
        state.items.retain(|e| e.id() != id);
        state.items.len() != before
    }

    /// Merges a fresh server copy into the collection by id; appends when
    /// the entity is not present yet.
    pub fn upsert(&self, item: E) {
        let mut state = self.state.write();
        match state.items.iter_mut().find(|e| e.id() == item.id()) {
            Some(existing) => *existing = item,
            None => state.items.push(item),
        }
    }

    pub fn select(&self, id: Option<Uuid>) {
        self.state.write().selected_id = id;
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.write().error = error;
    }

    /// Marks the store loading and clears the previous error. The returned
    /// guard clears the loading flag when dropped, so every exit path out
    /// of a load (success, failure, early return) resets it.
    pub fn begin_load(&self) -> LoadingGuard<'_, E> {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        LoadingGuard { core: self }
    }
}

impl<E: Identified + Clone> Default for StoreCore<E> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LoadingGuard<'a, E> {
    core: &'a StoreCore<E>,
}

impl<E> Drop for LoadingGuard<'_, E> {
    fn drop(&mut self) {
        self.core.state.write().is_loading = false;
    }
}

/// `round(100 * numerator / max(denominator, 1))`: a zero denominator
/// yields 0 instead of a division error.
pub(crate) fn percentage(numerator: u64, denominator: u64) -> u32 {
    let denominator = denominator.max(1);
    ((100.0 * numerator as f64) / denominator as f64).round() as u32
}
