//! Composition root. Everything with app lifetime is constructed here,
//! once, and handed down; there are no module-level globals and no hidden
//! statics anywhere in the crate.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::{KeyValueStore, Session};
use crate::config::Config;
use crate::gateway::{RestClient, RestCollection, RestDocuments};
use crate::intelligence::{CannedIntelligence, IntelPanel, IntelligenceProvider};
use crate::models::application::{ApplicationDraft, ApplicationPatch, JobApplication};
use crate::models::company::{Company, CompanyDraft, CompanyPatch};
use crate::notify::NotificationSink;
use crate::store::{ApplicationStore, CompanyStore, DocumentStore};

pub struct AppCore {
    pub config: Config,
    pub session: Arc<Session>,
    pub applications: Arc<ApplicationStore>,
    pub companies: Arc<CompanyStore>,
    pub documents: Arc<DocumentStore>,
    pub intel: Arc<IntelPanel>,
    pub sink: Arc<dyn NotificationSink>,
}

impl AppCore {
    /// Wires the stores against the REST backend from `config`. The
    /// canned intelligence provider stands in until a real one exists.
    pub fn with_rest_backend(
        config: Config,
        storage: Arc<dyn KeyValueStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let session = Arc::new(Session::restore(storage));
        info!(
            signed_in = session.is_signed_in(),
            "Session restored from storage"
        );

        let rest = RestClient::new(&config, session.clone());
        let applications_api: RestCollection<JobApplication, ApplicationDraft, ApplicationPatch> =
            RestCollection::new(rest.clone(), "applications");
        let companies_api: RestCollection<Company, CompanyDraft, CompanyPatch> =
            RestCollection::new(rest.clone(), "companies");

        let applications = Arc::new(ApplicationStore::new(
            Arc::new(applications_api),
            sink.clone(),
            session.clone(),
        ));
        let companies = Arc::new(CompanyStore::new(
            Arc::new(companies_api),
            sink.clone(),
            session.clone(),
        ));
        let documents = Arc::new(DocumentStore::new(
            Arc::new(RestDocuments::new(rest)),
            sink.clone(),
            session.clone(),
            config.document_quota_bytes,
        ));

        let provider: Arc<dyn IntelligenceProvider> =
            Arc::new(CannedIntelligence::with_default_delay());
        let intel = Arc::new(IntelPanel::new(provider));

        info!("Client core initialized against {}", config.api_base_url);
        Self {
            config,
            session,
            applications,
            companies,
            documents,
            intel,
            sink,
        }
    }

    /// The quiet period for debounced notes saves, from config.
    pub fn notes_debounce(&self) -> Duration {
        Duration::from_millis(self.config.notes_debounce_ms)
    }

    /// Initial data load after sign-in. Each store records its own error;
    /// a failed collection does not block the others.
    pub async fn load_everything(&self) {
        self.applications.load_all().await;
        self.companies.load_all().await;
        self.documents.load_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::notify::NullSink;

    #[test]
    fn test_composition_root_builds_from_config() {
        let core = AppCore::with_rest_backend(
            Config::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(NullSink),
        );
        assert!(!core.session.is_signed_in());
        assert!(core.applications.items().is_empty());
        assert_eq!(core.notes_debounce(), Duration::from_millis(1000));
    }
}
