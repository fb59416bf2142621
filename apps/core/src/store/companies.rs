//! Company store. Same optimistic contract as the application store, plus
//! tech-stack normalization and the grouped-by-tier view.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::errors::{StoreError, StoreResult};
use crate::gateway::SharedGateway;
use crate::models::company::{normalize_tech_stack, Company, CompanyDraft, CompanyPatch, CompanyTier};
use crate::models::validation::validate_company_draft;
use crate::notify::{ConfirmRequest, Notice, NotificationSink};

use super::StoreCore;

#[derive(Debug, Clone, Default)]
pub struct CompanyFilters {
    pub query: Option<String>,
    pub tier: Option<CompanyTier>,
}

impl CompanyFilters {
    fn matches(&self, company: &Company) -> bool {
        if let Some(tier) = self.tier {
            if company.tier != tier {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let needle = query.trim().to_lowercase();
            if !needle.is_empty() && !Self::text_matches(company, &needle) {
                return false;
            }
        }
        true
    }

    fn text_matches(company: &Company, needle: &str) -> bool {
        company.name.to_lowercase().contains(needle)
            || company
                .industry
                .as_deref()
                .is_some_and(|i| i.to_lowercase().contains(needle))
            || company
                .website
                .as_deref()
                .is_some_and(|w| w.to_lowercase().contains(needle))
    }
}

pub struct CompanyStore {
    core: StoreCore<Company>,
    filters: parking_lot::RwLock<CompanyFilters>,
    gateway: SharedGateway<Company, CompanyDraft, CompanyPatch>,
    sink: Arc<dyn NotificationSink>,
    session: Arc<Session>,
}

impl CompanyStore {
    pub fn new(
        gateway: SharedGateway<Company, CompanyDraft, CompanyPatch>,
        sink: Arc<dyn NotificationSink>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            core: StoreCore::new(),
            filters: parking_lot::RwLock::new(CompanyFilters::default()),
            gateway,
            sink,
            session,
        }
    }

    // --- Reads ---

    pub fn items(&self) -> Vec<Company> {
        self.core.items()
    }

    pub fn get(&self, id: Uuid) -> Option<Company> {
        self.core.get(id)
    }

    pub fn is_loading(&self) -> bool {
        self.core.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.core.error()
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.core.selected_id()
    }

    pub fn selected(&self) -> Option<Company> {
        self.core.selected_id().and_then(|id| self.core.get(id))
    }

    pub fn filtered(&self) -> Vec<Company> {
        let filters = self.filters.read();
        self.core
            .items()
            .into_iter()
            .filter(|c| filters.matches(c))
            .collect()
    }

    /// Companies grouped by tier in tier order, preserving relative order
    /// within each group.
    pub fn grouped_by_tier(&self) -> Vec<(CompanyTier, Vec<Company>)> {
        let items = self.core.items();
        CompanyTier::ALL
            .iter()
            .map(|&tier| {
                let group: Vec<Company> =
                    items.iter().filter(|c| c.tier == tier).cloned().collect();
                (tier, group)
            })
            .collect()
    }

    // --- Filter state ---

    pub fn set_query(&self, query: Option<String>) {
        self.filters.write().query = query;
    }

    pub fn set_tier_filter(&self, tier: Option<CompanyTier>) {
        self.filters.write().tier = tier;
    }

    pub fn clear_filters(&self) {
        *self.filters.write() = CompanyFilters::default();
    }

    // --- Actions ---

    pub async fn load_all(&self) {
        let _guard = self.core.begin_load();
        match self.gateway.list().await {
            Ok(items) => {
                debug!("Loaded {} companies", items.len());
                self.core.replace(items);
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.session.terminate();
                }
                warn!("Failed to load companies: {err}");
                self.core.set_error(Some(err.to_string()));
            }
        }
    }

    pub async fn create(&self, mut draft: CompanyDraft) -> StoreResult<Company> {
        validate_company_draft(&draft).into_result()?;
        draft.tech_stack = normalize_tech_stack(draft.tech_stack);
        match self.gateway.create(draft).await {
            Ok(created) => {
                self.core.push(created.clone());
                self.sink.notify(Notice::success("Company added"));
                Ok(created)
            }
            Err(err) => Err(self.report_failure("add the company", err)),
        }
    }

    pub async fn update(&self, id: Uuid, mut patch: CompanyPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(tech_stack) = patch.tech_stack.take() {
            patch.tech_stack = Some(normalize_tech_stack(tech_stack));
        }
        let snapshot = self.core.snapshot();
        if !self.core.apply(id, |company| patch.apply(company)) {
            return Err(StoreError::NotFound(format!("company {id}")));
        }
        match self.gateway.update(id, patch).await {
            Ok(fresh) => {
                self.core.upsert(fresh);
                Ok(())
            }
            Err(err) => {
                self.core.restore(snapshot);
                Err(self.report_failure("update the company", err))
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let confirmed = self
            .sink
            .confirm(ConfirmRequest::dangerous(
                "This removes the company. Applications pointing at it keep their history.",
                "Delete company?",
            ))
            .await;
        if !confirmed {
            return Ok(false);
        }

        let snapshot = self.core.snapshot();
        let selected = self.core.selected_id();
        if !self.core.remove(id) {
            return Err(StoreError::NotFound(format!("company {id}")));
        }
        if selected == Some(id) {
            self.core.select(None);
        }

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.sink.notify(Notice::success("Company deleted"));
                Ok(true)
            }
            Err(err) => {
                self.core.restore(snapshot);
                self.core.select(selected);
                Err(self.report_failure("delete the company", err))
            }
        }
    }

    pub async fn select_active(&self, id: Uuid) {
        self.core.select(Some(id));
        match self.gateway.get_by_id(id).await {
            Ok(fresh) => self.core.upsert(fresh),
            Err(err) => {
                if err.is_unauthorized() {
                    self.session.terminate();
                }
                debug!("Background refetch of company {id} failed: {err}");
            }
        }
    }

    pub fn clear_active(&self) {
        self.core.select(None);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::gateway::{CollectionGateway, InMemoryGateway};
    use crate::notify::{NoticeKind, RecordingSink};
    use chrono::Utc;

    fn company(name: &str, tier: CompanyTier) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            website: None,
            address: None,
            industry: None,
            tech_stack: Vec::new(),
            tier,
            total_applications: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct Fixture {
        store: CompanyStore,
        gateway: Arc<InMemoryGateway<Company, CompanyDraft, CompanyPatch>>,
        sink: Arc<RecordingSink>,
    }

    async fn loaded_fixture(seed: Vec<Company>) -> Fixture {
        let gateway = Arc::new(InMemoryGateway::companies(seed));
        let sink = Arc::new(RecordingSink::new());
        let session = Arc::new(Session::restore(Arc::new(MemoryStorage::new())));
        let store = CompanyStore::new(gateway.clone(), sink.clone(), session);
        store.load_all().await;
        Fixture {
            store,
            gateway,
            sink,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_tech_stack() {
        let f = loaded_fixture(vec![]).await;
        let mut draft = CompanyDraft::new("Acme");
        draft.tech_stack = vec!["Rust".to_string(), "rust".to_string(), " Go ".to_string()];
        let created = f.store.create(draft).await.unwrap();
        assert_eq!(created.tech_stack, vec!["Rust".to_string(), "Go".to_string()]);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name_without_network() {
        let f = loaded_fixture(vec![]).await;
        f.gateway.fail_next_call();
        let result = f.store.create(CompanyDraft::new("  ")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(f.store.items().is_empty());
        assert!(f.gateway.list().await.is_err());
    }

    #[tokio::test]
    async fn test_update_rolls_back_on_failure() {
        let seed = vec![company("Acme", CompanyTier::Tier2)];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        let before = f.store.items();

        f.gateway.fail_next_call();
        let patch = CompanyPatch {
            name: Some("Acme Rebranded".to_string()),
            ..CompanyPatch::default()
        };
        assert!(f.store.update(id, patch).await.is_err());
        assert_eq!(f.store.items(), before);
        assert_eq!(f.sink.count_of(NoticeKind::Error), 1);
    }

    #[tokio::test]
    async fn test_grouped_by_tier_preserves_order() {
        let f = loaded_fixture(vec![
            company("A", CompanyTier::Tier2),
            company("B", CompanyTier::Tier1),
            company("C", CompanyTier::Tier2),
        ])
        .await;
        let groups = f.store.grouped_by_tier();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, CompanyTier::Tier1);
        assert_eq!(groups[0].1.len(), 1);
        let tier2_names: Vec<&str> = groups[1].1.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(tier2_names, vec!["A", "C"]);
        assert!(groups[2].1.is_empty());
    }

    #[tokio::test]
    async fn test_tier_and_query_filters() {
        let mut acme = company("Acme", CompanyTier::Tier1);
        acme.industry = Some("Robotics".to_string());
        let f = loaded_fixture(vec![
            acme,
            company("Beta Robotics", CompanyTier::Tier2),
            company("Gamma", CompanyTier::Tier1),
        ])
        .await;

        f.store.set_query(Some("robotics".to_string()));
        f.store.set_tier_filter(Some(CompanyTier::Tier1));
        let filtered = f.store.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_delete_cancel_leaves_collection_untouched() {
        let seed = vec![company("Acme", CompanyTier::Tier2)];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        f.sink.set_confirm_answer(false);
        assert!(!f.store.delete(id).await.unwrap());
        assert_eq!(f.store.items().len(), 1);
    }
}
