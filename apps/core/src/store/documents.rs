//! Document store: uploaded resumes and cover letters, the master-resume
//! flag, and the storage-quota readout.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::errors::{StoreError, StoreResult};
use crate::models::document::{Document, DocumentDraft, DocumentPatch};
use crate::models::validation::validate_document_draft;
use crate::notify::{ConfirmRequest, Notice, NotificationSink};

use super::{percentage, StoreCore};
use crate::gateway::DocumentGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    pub used_bytes: u64,
    pub quota_bytes: u64,
    /// 0-100-ish; can exceed 100 when the quota is overshot.
    pub percent_used: u32,
}

pub struct DocumentStore {
    core: StoreCore<Document>,
    gateway: Arc<dyn DocumentGateway>,
    sink: Arc<dyn NotificationSink>,
    session: Arc<Session>,
    quota_bytes: u64,
}

impl DocumentStore {
    pub fn new(
        gateway: Arc<dyn DocumentGateway>,
        sink: Arc<dyn NotificationSink>,
        session: Arc<Session>,
        quota_bytes: u64,
    ) -> Self {
        Self {
            core: StoreCore::new(),
            gateway,
            sink,
            session,
            quota_bytes,
        }
    }

    // --- Reads ---

    pub fn items(&self) -> Vec<Document> {
        self.core.items()
    }

    pub fn get(&self, id: Uuid) -> Option<Document> {
        self.core.get(id)
    }

    pub fn is_loading(&self) -> bool {
        self.core.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.core.error()
    }

    pub fn master(&self) -> Option<Document> {
        self.core.items().into_iter().find(|d| d.is_master)
    }

    pub fn storage_usage(&self) -> StorageUsage {
        let used_bytes: u64 = self.core.items().iter().map(|d| d.size_bytes).sum();
        StorageUsage {
            used_bytes,
            quota_bytes: self.quota_bytes,
            percent_used: percentage(used_bytes, self.quota_bytes),
        }
    }

    // --- Actions ---

    pub async fn load_all(&self) {
        let _guard = self.core.begin_load();
        match self.gateway.list().await {
            Ok(items) => {
                debug!("Loaded {} documents", items.len());
                self.core.replace(items);
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.session.terminate();
                }
                warn!("Failed to load documents: {err}");
                self.core.set_error(Some(err.to_string()));
            }
        }
    }

    pub async fn upload(&self, draft: DocumentDraft) -> StoreResult<Document> {
        validate_document_draft(&draft).into_result()?;
        match self.gateway.create(draft).await {
            Ok(created) => {
                self.core.push(created.clone());
                self.sink
                    .notify(Notice::success(format!("Uploaded {}", created.file_name)));
                Ok(created)
            }
            Err(err) => Err(self.report_failure("upload the document", err)),
        }
    }

    pub async fn rename(&self, id: Uuid, patch: DocumentPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let snapshot = self.core.snapshot();
        if !self.core.apply(id, |doc| patch.apply(doc)) {
            return Err(StoreError::NotFound(format!("document {id}")));
        }
        match self.gateway.update(id, patch).await {
            Ok(fresh) => {
                self.core.upsert(fresh);
                Ok(())
            }
            Err(err) => {
                self.core.restore(snapshot);
                Err(self.report_failure("rename the document", err))
            }
        }
    }

    /// Moves the master flag: optimistically clears every flag and sets the
    /// one, then reconciles against the server's copy. The compensating
    /// local update keeps at-most-one-master true even mid-flight.
    pub async fn set_master(&self, id: Uuid) -> StoreResult<()> {
        if self.core.get(id).is_none() {
            return Err(StoreError::NotFound(format!("document {id}")));
        }
        let snapshot = self.core.snapshot();
        let flagged: Vec<Uuid> = snapshot.iter().map(|d| d.id).collect();
        for doc_id in flagged {
            self.core.apply(doc_id, |doc| doc.is_master = doc.id == id);
        }

        match self.gateway.set_master(id).await {
            Ok(fresh) => {
                self.core.upsert(fresh);
                self.sink.notify(Notice::success("Master resume updated"));
                Ok(())
            }
            Err(err) => {
                self.core.restore(snapshot);
                Err(self.report_failure("set the master resume", err))
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let confirmed = self
            .sink
            .confirm(ConfirmRequest::dangerous(
                "This permanently deletes the file.",
                "Delete document?",
            ))
            .await;
        if !confirmed {
            return Ok(false);
        }

        let snapshot = self.core.snapshot();
        if !self.core.remove(id) {
            return Err(StoreError::NotFound(format!("document {id}")));
        }

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.sink.notify(Notice::success("Document deleted"));
                Ok(true)
            }
            Err(err) => {
                self.core.restore(snapshot);
                Err(self.report_failure("delete the document", err))
            }
        }
    }

    fn report_failure(&self, action: &str, err: StoreError) -> StoreError {
        if err.is_unauthorized() {
            self.session.terminate();
        }
        warn!("Mutation failed ({action}): {err}");
        self.sink.notify(Notice::error(
            format!("Could not {action}. Please try again."),
            "Something went wrong",
        ));
        err
    }
}
