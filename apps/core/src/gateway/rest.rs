//! REST gateway implementation. The single point of entry for all backend
//! HTTP in the client core: every collection call goes through `RestClient`
//! so auth headers and status mapping live in one place.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::auth::Session;
use crate::config::Config;
use crate::errors::{StoreError, StoreResult};
use crate::models::document::{Document, DocumentDraft, DocumentPatch};

use super::{CollectionGateway, DocumentGateway};

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Shared HTTP wrapper: base URL, bearer token from the session, and the
/// status-code to `StoreError` mapping.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl RestClient {
    pub fn new(config: &Config, session: Arc<Session>) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<reqwest::Response> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        Err(match status {
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            StatusCode::CONFLICT => StoreError::Conflict(message),
            _ => StoreError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> StoreResult<T> {
        debug!("GET {path}");
        let response = self.send(self.http.get(self.url(path))).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> StoreResult<T> {
        debug!("POST {path}");
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> StoreResult<T> {
        debug!("PATCH {path}");
        let response = self.send(self.http.patch(self.url(path)).json(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> StoreResult<()> {
        debug!("DELETE {path}");
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }
}

/// Generic REST collection at `/api/v1/<path>` with the conventional CRUD
/// verb layout: GET list, GET one, POST create, PATCH update, DELETE.
pub struct RestCollection<E, D, P> {
    rest: RestClient,
    path: &'static str,
    _marker: PhantomData<fn() -> (E, D, P)>,
}

impl<E, D, P> RestCollection<E, D, P> {
    pub fn new(rest: RestClient, path: &'static str) -> Self {
        Self {
            rest,
            path,
            _marker: PhantomData,
        }
    }

    fn item_path(&self, id: Uuid) -> String {
        format!("/{}/{}", self.path, id)
    }
}

#[async_trait]
impl<E, D, P> CollectionGateway for RestCollection<E, D, P>
where
    E: DeserializeOwned + Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
    P: Serialize + Send + Sync + 'static,
{
    type Entity = E;
    type Draft = D;
    type Patch = P;

    async fn list(&self) -> StoreResult<Vec<E>> {
        self.rest.get_json(&format!("/{}", self.path)).await
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<E> {
        self.rest.get_json(&self.item_path(id)).await
    }

    async fn create(&self, draft: D) -> StoreResult<E> {
        self.rest.post_json(&format!("/{}", self.path), &draft).await
    }

    async fn update(&self, id: Uuid, patch: P) -> StoreResult<E> {
        self.rest.patch_json(&self.item_path(id), &patch).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.rest.delete(&self.item_path(id)).await
    }
}

/// The documents collection plus the master-flag endpoint.
pub struct RestDocuments {
    inner: RestCollection<Document, DocumentDraft, DocumentPatch>,
}

impl RestDocuments {
    pub fn new(rest: RestClient) -> Self {
        Self {
            inner: RestCollection::new(rest, "documents"),
        }
    }
}

#[async_trait]
impl CollectionGateway for RestDocuments {
    type Entity = Document;
    type Draft = DocumentDraft;
    type Patch = DocumentPatch;

    async fn list(&self) -> StoreResult<Vec<Document>> {
        self.inner.list().await
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Document> {
        self.inner.get_by_id(id).await
    }

    async fn create(&self, draft: DocumentDraft) -> StoreResult<Document> {
        self.inner.create(draft).await
    }

    async fn update(&self, id: Uuid, patch: DocumentPatch) -> StoreResult<Document> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl DocumentGateway for RestDocuments {
    async fn set_master(&self, id: Uuid) -> StoreResult<Document> {
        self.inner
            .rest
            .post_json(&format!("/documents/{id}/master"), &serde_json::json!({}))
            .await
    }
}
