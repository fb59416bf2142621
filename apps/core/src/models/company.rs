use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyTier {
    Tier1,
    Tier2,
    Tier3,
}

impl CompanyTier {
    pub const ALL: [CompanyTier; 3] = [CompanyTier::Tier1, CompanyTier::Tier2, CompanyTier::Tier3];

    pub fn label(&self) -> &'static str {
        match self {
            CompanyTier::Tier1 => "Dream companies",
            CompanyTier::Tier2 => "Strong interest",
            CompanyTier::Tier3 => "Backup options",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    /// Deduplicated case-insensitively at the draft/patch seam.
    pub tech_stack: Vec<String>,
    pub tier: CompanyTier,
    /// Denormalized count maintained by the server.
    pub total_applications: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    pub website: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub tech_stack: Vec<String>,
    pub tier: CompanyTier,
}

impl CompanyDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: None,
            address: None,
            industry: None,
            tech_stack: Vec::new(),
            tier: CompanyTier::Tier2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<CompanyTier>,
}

impl CompanyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.website.is_none()
            && self.address.is_none()
            && self.industry.is_none()
            && self.tech_stack.is_none()
            && self.tier.is_none()
    }

    pub fn apply(&self, company: &mut Company) {
        if let Some(name) = &self.name {
            company.name = name.clone();
        }
        if let Some(website) = &self.website {
            company.website = Some(website.clone());
        }
        if let Some(address) = &self.address {
            company.address = Some(address.clone());
        }
        if let Some(industry) = &self.industry {
            company.industry = Some(industry.clone());
        }
        if let Some(tech_stack) = &self.tech_stack {
            company.tech_stack = normalize_tech_stack(tech_stack.clone());
        }
        if let Some(tier) = self.tier {
            company.tier = tier;
        }
        company.updated_at = Utc::now();
    }
}

/// Trims entries, drops empties, and deduplicates case-insensitively while
/// preserving first-occurrence order.
pub fn normalize_tech_stack(raw: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dedupes_case_insensitively() {
        let stack = normalize_tech_stack(vec![
            "Rust".to_string(),
            "rust".to_string(),
            "Postgres".to_string(),
            "RUST".to_string(),
        ]);
        assert_eq!(stack, vec!["Rust".to_string(), "Postgres".to_string()]);
    }

    #[test]
    fn test_normalize_trims_and_drops_empties() {
        let stack = normalize_tech_stack(vec![
            "  Kafka ".to_string(),
            "".to_string(),
            "   ".to_string(),
        ]);
        assert_eq!(stack, vec!["Kafka".to_string()]);
    }

    #[test]
    fn test_normalize_preserves_first_occurrence_order() {
        let stack = normalize_tech_stack(vec![
            "Go".to_string(),
            "Rust".to_string(),
            "go".to_string(),
        ]);
        assert_eq!(stack, vec!["Go".to_string(), "Rust".to_string()]);
    }

    #[test]
    fn test_patch_normalizes_tech_stack() {
        let mut company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            website: None,
            address: None,
            industry: None,
            tech_stack: Vec::new(),
            tier: CompanyTier::Tier2,
            total_applications: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let patch = CompanyPatch {
            tech_stack: Some(vec!["Rust".to_string(), "rust".to_string()]),
            ..CompanyPatch::default()
        };
        patch.apply(&mut company);
        assert_eq!(company.tech_stack, vec!["Rust".to_string()]);
    }
}
