use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pipeline status of a single application.
///
/// Deliberately permissive: any status may follow any other. Moves happen
/// through direct user action (board drag or form edit), so Applied can jump
/// straight to Rejected and a Rejected application can be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    PhoneScreen,
    TechnicalTask,
    Interviewing,
    Offer,
    Accepted,
    Rejected,
    Ghosted,
}

impl ApplicationStatus {
    /// Every status in board-column order.
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::Applied,
        ApplicationStatus::PhoneScreen,
        ApplicationStatus::TechnicalTask,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offer,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Ghosted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::PhoneScreen => "Phone Screen",
            ApplicationStatus::TechnicalTask => "Technical Task",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Ghosted => "Ghosted",
        }
    }

    /// Terminal statuses: the pipeline ended, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Ghosted
        )
    }

    /// Whether the employer has responded at all.
    pub fn is_response(&self) -> bool {
        !matches!(self, ApplicationStatus::Applied | ApplicationStatus::Ghosted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub company_id: Uuid,
    pub role_title: String,
    pub status: ApplicationStatus,
    pub priority: Priority,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 0-100. Clamped at the draft/patch seam, not re-checked elsewhere.
    pub match_score: u8,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub document_id: Option<Uuid>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// Creation payload. The server assigns the id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub company_id: Uuid,
    pub role_title: String,
    pub status: ApplicationStatus,
    pub priority: Priority,
    pub match_score: u8,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub document_id: Option<Uuid>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

impl ApplicationDraft {
    pub fn new(company_id: Uuid, role_title: impl Into<String>) -> Self {
        Self {
            company_id,
            role_title: role_title.into(),
            status: ApplicationStatus::Applied,
            priority: Priority::Medium,
            match_score: 0,
            salary_min: None,
            salary_max: None,
            document_id: None,
            skills: Vec::new(),
            notes: None,
            source: None,
        }
    }
}

/// Explicit partial update. Every updatable field is enumerated here, so the
/// update surface is exhaustive at compile time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ApplicationPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role_title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.match_score.is_none()
            && self.salary_min.is_none()
            && self.salary_max.is_none()
            && self.document_id.is_none()
            && self.skills.is_none()
            && self.notes.is_none()
            && self.source.is_none()
    }

    /// Merges the patch over an existing application and bumps `updated_at`.
    pub fn apply(&self, app: &mut JobApplication) {
        if let Some(role_title) = &self.role_title {
            app.role_title = role_title.clone();
        }
        if let Some(status) = self.status {
            app.status = status;
        }
        if let Some(priority) = self.priority {
            app.priority = priority;
        }
        if let Some(match_score) = self.match_score {
            app.match_score = match_score.min(100);
        }
        if let Some(salary_min) = self.salary_min {
            app.salary_min = Some(salary_min);
        }
        if let Some(salary_max) = self.salary_max {
            app.salary_max = Some(salary_max);
        }
        if let Some(document_id) = self.document_id {
            app.document_id = Some(document_id);
        }
        if let Some(skills) = &self.skills {
            app.skills = skills.clone();
        }
        if let Some(notes) = &self.notes {
            app.notes = Some(notes.clone());
        }
        if let Some(source) = &self.source {
            app.source = Some(source.clone());
        }
        app.updated_at = Utc::now();
    }
}
