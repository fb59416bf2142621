//! Job application store: the collection behind the board, the list view,
//! and the pipeline metrics.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::debounce::DebouncedWriter;
use crate::errors::{StoreError, StoreResult};
use crate::gateway::SharedGateway;
use crate::models::application::{
    ApplicationDraft, ApplicationPatch, ApplicationStatus, JobApplication,
};
use crate::models::validation::validate_application_draft;
use crate::notify::{ConfirmRequest, Notice, NotificationSink};

use super::{percentage, StoreCore};

/// Active filters, combined with AND. Free text matches case-insensitively
/// as a substring across role title, skills, notes, and source.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilters {
    pub query: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub company_id: Option<Uuid>,
}

impl ApplicationFilters {
    fn matches(&self, app: &JobApplication) -> bool {
        if let Some(status) = self.status {
            if app.status != status {
                return false;
            }
        }
        if let Some(company_id) = self.company_id {
            if app.company_id != company_id {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let needle = query.trim().to_lowercase();
            if !needle.is_empty() && !Self::text_matches(app, &needle) {
                return false;
            }
        }
        true
    }

    fn text_matches(app: &JobApplication, needle: &str) -> bool {
        app.role_title.to_lowercase().contains(needle)
            || app.skills.iter().any(|s| s.to_lowercase().contains(needle))
            || app
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
            || app
                .source
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(needle))
    }
}

/// Pipeline metrics derived from the full (unfiltered) collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationMetrics {
    pub total: usize,
    /// One entry per status, in board-column order. Counts sum to `total`.
    pub by_status: Vec<(ApplicationStatus, usize)>,
    pub active: usize,
    pub interviews: usize,
    pub offers: usize,
    /// Share of applications the employer responded to, 0-100.
    pub response_rate: u32,
    /// Share of applications that reached Offer or Accepted, 0-100.
    pub success_rate: u32,
    pub average_match_score: u32,
}

/// Pure derivation; an empty list yields all-zero metrics, never NaN.
pub fn compute_metrics(items: &[JobApplication]) -> ApplicationMetrics {
    let total = items.len();
    let by_status: Vec<(ApplicationStatus, usize)> = ApplicationStatus::ALL
        .iter()
        .map(|&status| (status, items.iter().filter(|a| a.status == status).count()))
        .collect();

    let active = items.iter().filter(|a| !a.status.is_terminal()).count();
    let interviews = items
        .iter()
        .filter(|a| {
            matches!(
                a.status,
                ApplicationStatus::PhoneScreen
                    | ApplicationStatus::TechnicalTask
                    | ApplicationStatus::Interviewing
            )
        })
        .count();
    let offers = items
        .iter()
        .filter(|a| matches!(a.status, ApplicationStatus::Offer | ApplicationStatus::Accepted))
        .count();
    let responded = items.iter().filter(|a| a.status.is_response()).count();
    let score_sum: u64 = items.iter().map(|a| a.match_score as u64).sum();

    ApplicationMetrics {
        total,
        by_status,
        active,
        interviews,
        offers,
        response_rate: percentage(responded as u64, total as u64),
        success_rate: percentage(offers as u64, total as u64),
        average_match_score: percentage(score_sum, (total as u64) * 100),
    }
}

pub struct ApplicationStore {
    core: StoreCore<JobApplication>,
    filters: parking_lot::RwLock<ApplicationFilters>,
    gateway: SharedGateway<JobApplication, ApplicationDraft, ApplicationPatch>,
    sink: Arc<dyn NotificationSink>,
    session: Arc<Session>,
}

impl ApplicationStore {
    pub fn new(
        gateway: SharedGateway<JobApplication, ApplicationDraft, ApplicationPatch>,
        sink: Arc<dyn NotificationSink>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            core: StoreCore::new(),
            filters: parking_lot::RwLock::new(ApplicationFilters::default()),
            gateway,
            sink,
            session,
        }
    }

    // --- Reads ---

    pub fn items(&self) -> Vec<JobApplication> {
        self.core.items()
    }

    pub fn get(&self, id: Uuid) -> Option<JobApplication> {
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

    pub fn selected(&self) -> Option<JobApplication> {
        self.core.selected_id().and_then(|id| self.core.get(id))
    }

    pub fn filters(&self) -> ApplicationFilters {
        self.filters.read().clone()
    }

    /// AND of the active filters over the full collection.
    pub fn filtered(&self) -> Vec<JobApplication> {
        let filters = self.filters.read();
        self.core
            .items()
            .into_iter()
            .filter(|app| filters.matches(app))
            .collect()
    }

    pub fn metrics(&self) -> ApplicationMetrics {
        compute_metrics(&self.core.items())
    }

    // --- Filter state ---

    pub fn set_filters(&self, filters: ApplicationFilters) {
        *self.filters.write() = filters;
    }

    pub fn set_query(&self, query: Option<String>) {
        self.filters.write().query = query;
    }

    pub fn set_status_filter(&self, status: Option<ApplicationStatus>) {
        self.filters.write().status = status;
    }

    pub fn set_company_filter(&self, company_id: Option<Uuid>) {
        self.filters.write().company_id = company_id;
    }

    pub fn clear_filters(&self) {
        *self.filters.write() = ApplicationFilters::default();
    }

    // --- Actions ---

    /// Replaces the collection from the server. On failure the previous
    /// items stay visible (stale data beats a blank screen) and the error
    /// is recorded for the UI to offer a retry.
    pub async fn load_all(&self) {
        let _guard = self.core.begin_load();
        match self.gateway.list().await {
            Ok(items) => {
                debug!("Loaded {} applications", items.len());
                self.core.replace(items);
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.session.terminate();
                }
                warn!("Failed to load applications: {err}");
                self.core.set_error(Some(err.to_string()));
            }
        }
    }

    /// No optimistic insert: the id is server-assigned, so the entity only
    /// appears once the server returns it.
    pub async fn create(&self, draft: ApplicationDraft) -> StoreResult<JobApplication> {
        validate_application_draft(&draft).into_result()?;
        match self.gateway.create(draft).await {
            Ok(created) => {
                self.core.push(created.clone());
                self.sink.notify(Notice::success("Application added"));
                Ok(created)
            }
            Err(err) => Err(self.report_failure("add the application", err)),
        }
    }

    /// Optimistic update: the patch is visible in `items` before the
    /// network call settles, and rolled back verbatim when it fails.
    pub async fn update(&self, id: Uuid, patch: ApplicationPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let snapshot = self.core.snapshot();
        if !self.core.apply(id, |app| patch.apply(app)) {
            return Err(StoreError::NotFound(format!("application {id}")));
        }
        match self.gateway.update(id, patch).await {
            Ok(fresh) => {
                // Server-assigned fields (updated_at) come back on success.
                self.core.upsert(fresh);
                Ok(())
            }
            Err(err) => {
                self.core.restore(snapshot);
                Err(self.report_failure("update the application", err))
            }
        }
    }

    /// Moves a board card. Just an update with a status patch; there is no
    /// transition table to consult.
    pub async fn move_to(&self, id: Uuid, status: ApplicationStatus) -> StoreResult<()> {
        self.update(id, ApplicationPatch::status(status)).await
    }

    /// Gated on an explicit confirm. Returns `Ok(false)` when the user
    /// cancels; the gateway is not called in that case.
    pub async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let confirmed = self
            .sink
            .confirm(ConfirmRequest::dangerous(
                "This permanently removes the application and its notes.",
                "Delete application?",
            ))
            .await;
        if !confirmed {
            return Ok(false);
        }

        let snapshot = self.core.snapshot();
        let selected = self.core.selected_id();
        if !self.core.remove(id) {
            return Err(StoreError::NotFound(format!("application {id}")));
        }
        if selected == Some(id) {
            self.core.select(None);
        }

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.sink.notify(Notice::success("Application deleted"));
                Ok(true)
            }
            Err(err) => {
                self.core.restore(snapshot);
                self.core.select(selected);
                Err(self.report_failure("delete the application", err))
            }
        }
    }

    /// Detail-view selection. Also refetches the one entity in the
    /// background and merges the fresh copy, reconciling staleness; a
    /// failed refetch leaves the collection untouched.
    pub async fn select_active(&self, id: Uuid) {
        self.core.select(Some(id));
        match self.gateway.get_by_id(id).await {
            Ok(fresh) => self.core.upsert(fresh),
            Err(err) => {
                if err.is_unauthorized() {
                    self.session.terminate();
                }
                debug!("Background refetch of application {id} failed: {err}");
            }
        }
    }

    pub fn clear_active(&self) {
        self.core.select(None);
    }

    /// Debounced notes autosave for the detail view. Keystrokes go through
    /// `set`; the pending text is sent as a notes patch after the quiet
    /// period, or immediately on `flush` when the user navigates away.
    pub fn notes_autosaver(self: Arc<Self>, id: Uuid, quiet: Duration) -> DebouncedWriter {
        DebouncedWriter::spawn(quiet, move |notes: String| {
            let store = Arc::clone(&self);
            async move {
                if let Err(err) = store.update(id, ApplicationPatch::notes(notes)).await {
                    warn!("Debounced notes save failed: {err}");
                }
            }
        })
    }

    /// Converts a failed mutation into one notification, handling the 401
    /// session reset. The store stays usable afterwards.
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
    use crate::auth::{MemoryStorage, Session};
    use crate::gateway::{CollectionGateway, InMemoryGateway};
    use crate::models::application::Priority;
    use crate::models::user::UserProfile;
    use crate::notify::{NoticeKind, RecordingSink};
    use chrono::Utc;

    fn app_with(status: ApplicationStatus, role: &str) -> JobApplication {
        JobApplication {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role_title: role.to_string(),
            status,
            priority: Priority::Medium,
            applied_at: Utc::now(),
            updated_at: Utc::now(),
            match_score: 60,
            salary_min: None,
            salary_max: None,
            document_id: None,
            skills: vec!["rust".to_string()],
            notes: None,
            source: None,
        }
    }

    struct Fixture {
        store: Arc<ApplicationStore>,
        gateway: Arc<InMemoryGateway<JobApplication, ApplicationDraft, ApplicationPatch>>,
        sink: Arc<RecordingSink>,
        session: Arc<Session>,
    }

    fn fixture(seed: Vec<JobApplication>) -> Fixture {
        let gateway = Arc::new(InMemoryGateway::applications(seed));
        let sink = Arc::new(RecordingSink::new());
        let storage = Arc::new(MemoryStorage::new());
        let session = Arc::new(Session::restore(storage));
        session
            .sign_in(
                "tok-test".to_string(),
                UserProfile {
                    id: Uuid::new_v4(),
                    email: "ada@lovelace.dev".to_string(),
                    display_name: "Ada".to_string(),
                    headline: None,
                },
            )
            .unwrap();
        let store = Arc::new(ApplicationStore::new(
            gateway.clone(),
            sink.clone(),
            session.clone(),
        ));
        Fixture {
            store,
            gateway,
            sink,
            session,
        }
    }

    async fn loaded_fixture(seed: Vec<JobApplication>) -> Fixture {
        let f = fixture(seed);
        f.store.load_all().await;
        f
    }

    #[tokio::test]
    async fn test_load_all_replaces_items() {
        let f = fixture(vec![app_with(ApplicationStatus::Applied, "A")]);
        f.store.load_all().await;
        assert_eq!(f.store.items().len(), 1);
        assert!(!f.store.is_loading());
        assert!(f.store.error().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_keeps_stale_items_and_records_error() {
        let f = loaded_fixture(vec![app_with(ApplicationStatus::Applied, "A")]).await;
        f.gateway.fail_next_call();
        f.store.load_all().await;
        // Stale-but-present beats blanking the UI.
        assert_eq!(f.store.items().len(), 1);
        assert!(f.store.error().is_some());
        assert!(!f.store.is_loading());
    }

    #[tokio::test]
    async fn test_create_appends_server_entity_only_on_success() {
        let f = loaded_fixture(vec![]).await;
        let created = f
            .store
            .create(ApplicationDraft::new(Uuid::new_v4(), "Engineer"))
            .await
            .unwrap();
        assert_eq!(f.store.items().len(), 1);
        assert_eq!(f.store.items()[0].id, created.id);
        assert_eq!(f.sink.count_of(NoticeKind::Success), 1);
    }

    #[tokio::test]
    async fn test_create_failure_adds_nothing() {
        let f = loaded_fixture(vec![]).await;
        f.gateway.fail_next_call();
        let result = f
            .store
            .create(ApplicationDraft::new(Uuid::new_v4(), "Engineer"))
            .await;
        assert!(result.is_err());
        assert!(f.store.items().is_empty());
        assert_eq!(f.sink.count_of(NoticeKind::Error), 1);
    }

    #[tokio::test]
    async fn test_create_validation_failure_never_reaches_gateway() {
        let f = loaded_fixture(vec![]).await;
        // Would fail if called: the next gateway call is poisoned.
        f.gateway.fail_next_call();
        let result = f
            .store
            .create(ApplicationDraft::new(Uuid::new_v4(), "   "))
            .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        // The poisoned call is still pending, proving no network was made.
        assert!(f.gateway.list().await.is_err());
    }

    #[tokio::test]
    async fn test_update_is_visible_before_the_call_settles() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;

        let gate = f.gateway.hold_next_call();
        let store = f.store.clone();
        let task = tokio::spawn(async move {
            store
                .update(id, ApplicationPatch::status(ApplicationStatus::Offer))
                .await
        });
        tokio::task::yield_now().await;

        // The gateway call is still held open; the change is already visible.
        assert_eq!(f.store.get(id).unwrap().status, ApplicationStatus::Offer);

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert_eq!(f.store.get(id).unwrap().status, ApplicationStatus::Offer);
    }

    #[tokio::test]
    async fn test_update_rollback_restores_snapshot_verbatim() {
        let seed = vec![
            app_with(ApplicationStatus::Applied, "A"),
            app_with(ApplicationStatus::Offer, "B"),
        ];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        let before = f.store.items();

        let gate = f.gateway.hold_next_call();
        f.gateway.fail_next_call();
        let store = f.store.clone();
        let task = tokio::spawn(async move {
            store
                .update(id, ApplicationPatch::status(ApplicationStatus::Rejected))
                .await
        });
        tokio::task::yield_now().await;

        // Optimistically applied.
        assert_eq!(f.store.get(id).unwrap().status, ApplicationStatus::Rejected);

        gate.notify_one();
        let result = task.await.unwrap();
        assert!(result.is_err());

        // Rolled back verbatim, exactly one error notification.
        assert_eq!(f.store.get(id).unwrap().status, ApplicationStatus::Applied);
        assert_eq!(f.store.items(), before);
        assert_eq!(f.sink.count_of(NoticeKind::Error), 1);
    }

    #[tokio::test]
    async fn test_store_stays_usable_after_a_failed_mutation() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;

        f.gateway.fail_next_call();
        assert!(f.store.move_to(id, ApplicationStatus::Offer).await.is_err());

        f.store.move_to(id, ApplicationStatus::Offer).await.unwrap();
        assert_eq!(f.store.get(id).unwrap().status, ApplicationStatus::Offer);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_and_silent() {
        let f = loaded_fixture(vec![]).await;
        let result = f
            .store
            .update(Uuid::new_v4(), ApplicationPatch::status(ApplicationStatus::Offer))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(f.sink.notices().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        f.sink.set_confirm_answer(false);

        // Poison the next gateway call: it must never happen.
        f.gateway.fail_next_call();
        let deleted = f.store.delete(id).await.unwrap();
        assert!(!deleted);
        assert_eq!(f.store.items().len(), 1);
        assert!(f.gateway.list().await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_optimistically_and_rolls_back_on_failure() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        f.store.select_active(id).await;

        f.gateway.fail_next_call();
        assert!(f.store.delete(id).await.is_err());
        // Both the item and the selection came back.
        assert_eq!(f.store.items().len(), 1);
        assert_eq!(f.store.selected_id(), Some(id));
    }

    #[tokio::test]
    async fn test_delete_clears_selection_of_the_deleted_item() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        f.store.select_active(id).await;

        assert!(f.store.delete(id).await.unwrap());
        assert!(f.store.items().is_empty());
        assert_eq!(f.store.selected_id(), None);
    }

    #[tokio::test]
    async fn test_unauthorized_mutation_terminates_session() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;
        assert!(f.session.is_signed_in());

        f.gateway.fail_next_with(StoreError::Unauthorized);
        let result = f.store.move_to(id, ApplicationStatus::Offer).await;
        assert!(matches!(result, Err(StoreError::Unauthorized)));
        assert!(!f.session.is_signed_in());
        // Rollback still applies.
        assert_eq!(f.store.get(id).unwrap().status, ApplicationStatus::Applied);
    }

    #[tokio::test]
    async fn test_select_active_merges_fresh_copy() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;

        // The server moved on while our copy went stale.
        f.gateway
            .update(id, ApplicationPatch::status(ApplicationStatus::Interviewing))
            .await
            .unwrap();
        f.store.select_active(id).await;

        assert_eq!(f.store.selected().unwrap().status, ApplicationStatus::Interviewing);
    }

    #[tokio::test]
    async fn test_filters_combine_with_and() {
        let company = Uuid::new_v4();
        let mut a = app_with(ApplicationStatus::Applied, "Rust Backend Engineer");
        a.company_id = company;
        let b = app_with(ApplicationStatus::Applied, "Rust Platform Engineer");
        let mut c = app_with(ApplicationStatus::Offer, "Frontend Engineer");
        c.company_id = company;

        let f = loaded_fixture(vec![a.clone(), b, c]).await;
        f.store.set_query(Some("rust".to_string()));
        f.store.set_status_filter(Some(ApplicationStatus::Applied));
        f.store.set_company_filter(Some(company));

        let filtered = f.store.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, a.id);
    }

    #[tokio::test]
    async fn test_query_matches_notes_case_insensitively() {
        let mut a = app_with(ApplicationStatus::Applied, "Engineer");
        a.notes = Some("Spoke with the VP of Widgets".to_string());
        let f = loaded_fixture(vec![a, app_with(ApplicationStatus::Applied, "Other")]).await;
        f.store.set_query(Some("WIDGETS".to_string()));
        assert_eq!(f.store.filtered().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notes_autosaver_persists_after_the_quiet_period() {
        let seed = vec![app_with(ApplicationStatus::Applied, "A")];
        let id = seed[0].id;
        let f = loaded_fixture(seed).await;

        let writer = f
            .store
            .clone()
            .notes_autosaver(id, std::time::Duration::from_millis(200));
        writer.set("met the team, felt great");
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(f.store.get(id).unwrap().notes, None);

        tokio::time::advance(std::time::Duration::from_millis(250)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            f.store.get(id).unwrap().notes.as_deref(),
            Some("met the team, felt great")
        );
    }

    #[test]
    fn test_metrics_partition_sums_to_total() {
        let items = vec![
            app_with(ApplicationStatus::Applied, "A"),
            app_with(ApplicationStatus::Offer, "B"),
            app_with(ApplicationStatus::Rejected, "C"),
            app_with(ApplicationStatus::Interviewing, "D"),
        ];
        let metrics = compute_metrics(&items);
        assert_eq!(metrics.total, items.len());
        let partition_sum: usize = metrics.by_status.iter().map(|(_, n)| n).sum();
        assert_eq!(partition_sum, items.len());
    }

    #[test]
    fn test_metrics_empty_list_yields_zero_rates() {
        let metrics = compute_metrics(&[]);
        assert_eq!(metrics.total, 0);
        assert_eq!(metrics.success_rate, 0);
        assert_eq!(metrics.response_rate, 0);
        assert_eq!(metrics.average_match_score, 0);
    }

    #[test]
    fn test_metrics_rates() {
        let items = vec![
            app_with(ApplicationStatus::Applied, "A"),
            app_with(ApplicationStatus::Ghosted, "B"),
            app_with(ApplicationStatus::PhoneScreen, "C"),
            app_with(ApplicationStatus::Offer, "D"),
        ];
        let metrics = compute_metrics(&items);
        // Responded: phone screen + offer. Success: offer.
        assert_eq!(metrics.response_rate, 50);
        assert_eq!(metrics.success_rate, 25);
        assert_eq!(metrics.interviews, 1);
        assert_eq!(metrics.offers, 1);
        assert_eq!(metrics.active, 3);
    }
}
