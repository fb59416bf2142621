//! In-memory gateway fake. Backs the store tests and demo setups: seeded
//! with entities, optional one-shot failure injection, and a gate that
//! holds the next call open so a test can observe optimistic state while
//! the "network" is still in flight.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::errors::{StoreError, StoreResult};
use crate::models::application::{ApplicationDraft, ApplicationPatch, JobApplication};
use crate::models::company::{normalize_tech_stack, Company, CompanyDraft, CompanyPatch};
use crate::models::document::{Document, DocumentDraft, DocumentPatch};
use crate::store::Identified;

use super::{CollectionGateway, DocumentGateway};

pub struct InMemoryGateway<E, D, P> {
    items: Mutex<Vec<E>>,
    materialize: fn(D) -> E,
    apply_patch: fn(&mut E, &P),
    fail_next: Mutex<Option<StoreError>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl<E, D, P> InMemoryGateway<E, D, P>
where
    E: Identified + Clone + Send,
    D: Send,
    P: Send,
{
    pub fn with_behavior(seed: Vec<E>, materialize: fn(D) -> E, apply_patch: fn(&mut E, &P)) -> Self {
        Self {
            items: Mutex::new(seed),
            materialize,
            apply_patch,
            fail_next: Mutex::new(None),
            gate: Mutex::new(None),
        }
    }

    /// The next call fails with a transport error instead of completing.
    pub fn fail_next_call(&self) {
        self.fail_next_with(StoreError::Transport("injected failure".to_string()));
    }

    /// The next call fails with the given error. One-shot.
    pub fn fail_next_with(&self, err: StoreError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Holds the next call open until the returned handle is notified.
    /// The optimistic local mutation has already happened by the time the
    /// call blocks here, which is exactly what the gate exists to observe.
    pub fn hold_next_call(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(notify.clone());
        notify
    }

    /// Server-side view, for asserting what "persisted".
    pub fn stored(&self) -> Vec<E> {
        self.items.lock().clone()
    }

    async fn pass_gate(&self) -> StoreResult<()> {
        let gate = self.gate.lock().take();
        if let Some(notify) = gate {
            notify.notified().await;
        }
        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }
        Ok(())
    }

    fn find(&self, id: Uuid) -> StoreResult<E> {
        self.items
            .lock()
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("entity {id}")))
    }
}

#[async_trait]
impl<E, D, P> CollectionGateway for InMemoryGateway<E, D, P>
where
    E: Identified + Clone + Send + Sync + 'static,
    D: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    type Entity = E;
    type Draft = D;
    type Patch = P;

    async fn list(&self) -> StoreResult<Vec<E>> {
        self.pass_gate().await?;
        Ok(self.items.lock().clone())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<E> {
        self.pass_gate().await?;
        self.find(id)
    }

    async fn create(&self, draft: D) -> StoreResult<E> {
        self.pass_gate().await?;
        let entity = (self.materialize)(draft);
        self.items.lock().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: Uuid, patch: P) -> StoreResult<E> {
        self.pass_gate().await?;
        let mut items = self.items.lock();
        let entity = items
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| StoreError::NotFound(format!("entity {id}")))?;
        (self.apply_patch)(entity, &patch);
        Ok(entity.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.pass_gate().await?;
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|e| e.id() != id);
        if items.len() == before {
            return Err(StoreError::NotFound(format!("entity {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentGateway for InMemoryGateway<Document, DocumentDraft, DocumentPatch> {
    async fn set_master(&self, id: Uuid) -> StoreResult<Document> {
        self.pass_gate().await?;
        let mut items = self.items.lock();
        if !items.iter().any(|d| d.id == id) {
            return Err(StoreError::NotFound(format!("document {id}")));
        }
        let mut updated = None;
        for doc in items.iter_mut() {
            doc.is_master = doc.id == id;
            if doc.is_master {
                updated = Some(doc.clone());
            }
        }
        updated.ok_or_else(|| StoreError::NotFound(format!("document {id}")))
    }
}

impl InMemoryGateway<JobApplication, ApplicationDraft, ApplicationPatch> {
    pub fn applications(seed: Vec<JobApplication>) -> Self {
        Self::with_behavior(seed, materialize_application, |app, patch| patch.apply(app))
    }
}

impl InMemoryGateway<Company, CompanyDraft, CompanyPatch> {
    pub fn companies(seed: Vec<Company>) -> Self {
        Self::with_behavior(seed, materialize_company, |company, patch| {
            patch.apply(company)
        })
    }
}

impl InMemoryGateway<Document, DocumentDraft, DocumentPatch> {
    pub fn documents(seed: Vec<Document>) -> Self {
        Self::with_behavior(seed, materialize_document, |doc, patch| patch.apply(doc))
    }
}

fn materialize_application(draft: ApplicationDraft) -> JobApplication {
    let now = chrono::Utc::now();
    JobApplication {
        id: Uuid::new_v4(),
        company_id: draft.company_id,
        role_title: draft.role_title,
        status: draft.status,
        priority: draft.priority,
        applied_at: now,
        updated_at: now,
        match_score: draft.match_score.min(100),
        salary_min: draft.salary_min,
        salary_max: draft.salary_max,
        document_id: draft.document_id,
        skills: draft.skills,
        notes: draft.notes,
        source: draft.source,
    }
}

fn materialize_company(draft: CompanyDraft) -> Company {
    let now = chrono::Utc::now();
    Company {
        id: Uuid::new_v4(),
        name: draft.name,
        website: draft.website,
        address: draft.address,
        industry: draft.industry,
        tech_stack: normalize_tech_stack(draft.tech_stack),
        tier: draft.tier,
        total_applications: 0,
        created_at: now,
        updated_at: now,
    }
}

fn materialize_document(draft: DocumentDraft) -> Document {
    Document {
        id: Uuid::new_v4(),
        file_name: draft.file_name,
        size_bytes: draft.size_bytes,
        content_type: draft.content_type,
        uploaded_at: chrono::Utc::now(),
        is_master: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;

    #[tokio::test]
    async fn test_create_assigns_an_id_and_persists() {
        let gw = InMemoryGateway::applications(vec![]);
        let draft = ApplicationDraft::new(Uuid::new_v4(), "Engineer");
        let created = gw.create(draft).await.unwrap();
        assert_eq!(gw.stored().len(), 1);
        assert_eq!(gw.stored()[0].id, created.id);
    }

    #[tokio::test]
    async fn test_fail_next_call_is_one_shot() {
        let gw = InMemoryGateway::applications(vec![]);
        gw.fail_next_call();
        assert!(gw.list().await.is_err());
        assert!(gw.list().await.is_ok());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let gw = InMemoryGateway::applications(vec![]);
        let err = gw
            .update(Uuid::new_v4(), ApplicationPatch::status(ApplicationStatus::Offer))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
