use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded resume or cover letter. At most one document is the master
/// resume at a time; the document store maintains that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_master: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub file_name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

impl DocumentDraft {
    pub fn new(file_name: impl Into<String>, size_bytes: u64, content_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
            content_type: content_type.into(),
        }
    }
}

/// Rename is the only client-editable field; the master flag moves through
/// the dedicated `set_master` operation instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none()
    }

    pub fn apply(&self, document: &mut Document) {
        if let Some(file_name) = &self.file_name {
            document.file_name = file_name.clone();
        }
    }
}
