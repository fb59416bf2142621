//! Client-side form validation. Runs before any network call; a failed
//! check never reaches the gateway.

use crate::errors::StoreError;
use crate::models::application::ApplicationDraft;
use crate::models::company::CompanyDraft;
use crate::models::document::DocumentDraft;
use crate::models::user::UserProfile;

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            passed: issues.is_empty(),
            issues,
        }
    }

    /// Converts a failed report into a `StoreError::Validation` carrying all
    /// issue messages.
    pub fn into_result(self) -> Result<(), StoreError> {
        if self.passed {
            Ok(())
        } else {
            let joined = self
                .issues
                .iter()
                .map(|i| format!("{}: {}", i.field, i.message))
                .collect::<Vec<_>>()
                .join("; ");
            Err(StoreError::Validation(joined))
        }
    }
}

pub fn validate_application_draft(draft: &ApplicationDraft) -> ValidationReport {
    let mut issues = Vec::new();

    if draft.role_title.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "role_title",
            message: "Role title is required".to_string(),
        });
    }
    if draft.match_score > 100 {
        issues.push(ValidationIssue {
            field: "match_score",
            message: format!("Match score must be 0-100, got {}", draft.match_score),
        });
    }
    if let (Some(min), Some(max)) = (draft.salary_min, draft.salary_max) {
        if min > max {
            issues.push(ValidationIssue {
                field: "salary_min",
                message: format!("Salary minimum {min} exceeds maximum {max}"),
            });
        }
    }

    ValidationReport::from_issues(issues)
}

pub fn validate_company_draft(draft: &CompanyDraft) -> ValidationReport {
    let mut issues = Vec::new();

    if draft.name.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "name",
            message: "Company name is required".to_string(),
        });
    }
    if let Some(website) = &draft.website {
        if !website.trim().is_empty() && !looks_like_url(website) {
            issues.push(ValidationIssue {
                field: "website",
                message: format!("'{website}' does not look like a URL"),
            });
        }
    }

    ValidationReport::from_issues(issues)
}

pub fn validate_document_draft(draft: &DocumentDraft) -> ValidationReport {
    let mut issues = Vec::new();

    if draft.file_name.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "file_name",
            message: "File name is required".to_string(),
        });
    }
    if draft.size_bytes == 0 {
        issues.push(ValidationIssue {
            field: "size_bytes",
            message: "File is empty".to_string(),
        });
    }
    if !draft.content_type.contains('/') {
        issues.push(ValidationIssue {
            field: "content_type",
            message: format!("'{}' is not a media type", draft.content_type),
        });
    }

    ValidationReport::from_issues(issues)
}

pub fn validate_profile(profile: &UserProfile) -> ValidationReport {
    let mut issues = Vec::new();

    if !looks_like_email(&profile.email) {
        issues.push(ValidationIssue {
            field: "email",
            message: format!("'{}' is not a valid email address", profile.email),
        });
    }
    if profile.display_name.trim().chars().count() < 2 {
        issues.push(ValidationIssue {
            field: "display_name",
            message: "Display name must be at least 2 characters".to_string(),
        });
    }

    ValidationReport::from_issues(issues)
}

/// Minimal email shape check: non-empty local part, non-empty domain with a dot.
fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

fn looks_like_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://") || value.contains('.')
}
