//! Per-resource repositories
//!
//! A [`Repository`] is the only way the console reaches a collection on the
//! server. Every operation returns a tagged [`AppResult`], so controllers
//! can be tested against in-memory implementations.

use std::marker::PhantomData;

use async_trait::async_trait;
use shared::models::Resource;
use shared::{ApiResponse, AppError, AppResult, OneOrMany};
use urlencoding::encode;

use crate::HttpClient;

/// Typed CRUD access to one resource
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// Fetch the whole collection
    async fn list(&self) -> AppResult<Vec<R>>;

    /// Fetch one record
    async fn get(&self, id: &str) -> AppResult<R>;

    /// Create a record, returning it as stored
    async fn create(&self, payload: &R::Create) -> AppResult<R>;

    /// Update a record, returning it as stored
    async fn update(&self, id: &str, payload: &R::Update) -> AppResult<R>;

    /// Delete a record
    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// Repository backed by the REST API (`/{PATH}` and `/{PATH}/{id}`)
#[derive(Debug, Clone)]
pub struct RemoteRepository<R> {
    http: HttpClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RemoteRepository<R> {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::PATH, encode(id))
    }
}

fn log_failure(resource: &str, op: &str, err: &AppError) {
    tracing::warn!(resource, op, kind = %err.kind, message = %err.message, "request failed");
}

impl<R: Resource> RemoteRepository<R> {
    async fn fetch_all(&self) -> AppResult<Vec<R>> {
        self.http
            .get::<ApiResponse<Vec<R>>>(R::PATH)
            .await?
            .into_data(R::NAME)
    }

    async fn fetch_one(&self, id: &str) -> AppResult<R> {
        self.http
            .get::<ApiResponse<OneOrMany<R>>>(&Self::item_path(id))
            .await?
            .into_record(R::NAME)
    }

    async fn send_create(&self, payload: &R::Create) -> AppResult<R> {
        self.http
            .post::<ApiResponse<OneOrMany<R>>, _>(R::PATH, payload)
            .await?
            .into_record(R::NAME)
    }

    async fn send_update(&self, id: &str, payload: &R::Update) -> AppResult<R> {
        self.http
            .put::<ApiResponse<OneOrMany<R>>, _>(&Self::item_path(id), payload)
            .await?
            .into_record(R::NAME)
    }

    async fn send_delete(&self, id: &str) -> AppResult<()> {
        self.http
            .delete::<ApiResponse<serde_json::Value>>(&Self::item_path(id))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for RemoteRepository<R> {
    async fn list(&self) -> AppResult<Vec<R>> {
        self.fetch_all()
            .await
            .inspect_err(|e| log_failure(R::NAME, "list", e))
    }

    async fn get(&self, id: &str) -> AppResult<R> {
        self.fetch_one(id)
            .await
            .inspect_err(|e| log_failure(R::NAME, "get", e))
    }

    async fn create(&self, payload: &R::Create) -> AppResult<R> {
        self.send_create(payload)
            .await
            .inspect_err(|e| log_failure(R::NAME, "create", e))
    }

    async fn update(&self, id: &str, payload: &R::Update) -> AppResult<R> {
        self.send_update(id, payload)
            .await
            .inspect_err(|e| log_failure(R::NAME, "update", e))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.send_delete(id)
            .await
            .inspect_err(|e| log_failure(R::NAME, "delete", e))
    }
}
