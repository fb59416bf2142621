//! Remote collection gateways: the thin network seam for one entity type's
//! CRUD calls. Stores hold gateways as trait objects, so tests swap in the
//! in-memory fake and production wires up the REST implementation.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::models::document::{Document, DocumentDraft, DocumentPatch};

pub mod memory;
pub mod rest;

pub use memory::InMemoryGateway;
pub use rest::{RestClient, RestCollection, RestDocuments};

/// CRUD calls for one entity collection. The server assigns ids on create;
/// update returns the server's copy so stores can reconcile server-assigned
/// fields (timestamps, denormalized counts).
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    type Entity: Send;
    type Draft: Send;
    type Patch: Send;

    async fn list(&self) -> StoreResult<Vec<Self::Entity>>;
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Self::Entity>;
    async fn create(&self, draft: Self::Draft) -> StoreResult<Self::Entity>;
    async fn update(&self, id: Uuid, patch: Self::Patch) -> StoreResult<Self::Entity>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Documents additionally expose the master-flag move as one server-side
/// operation, so exclusivity is reconciled against server truth.
#[async_trait]
pub trait DocumentGateway:
    CollectionGateway<Entity = Document, Draft = DocumentDraft, Patch = DocumentPatch>
{
    async fn set_master(&self, id: Uuid) -> StoreResult<Document>;
}

pub type SharedGateway<E, D, P> =
    Arc<dyn CollectionGateway<Entity = E, Draft = D, Patch = P>>;
