//! Resource controllers
//!
//! 一个资源一个控制器：校验输入 → 发送请求 → 更新集合 → 发布提示。
//! 失败时保留原有状态，不自动重试。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashSet;
use shared::models::Resource;
use shared::{AppError, AppResult, CrudAction, ErrorKind};
use tally_client::Repository;
use tokio::sync::RwLock;

use crate::notice::NoticeBoard;
use crate::store::{Collection, FetchOutcome, RequestStatus};
use crate::tracker::RequestTracker;
use crate::view::{ListQuery, ListView, csv};

/// Marks a record as having a mutation in flight until dropped
struct InFlight {
    set: Arc<DashSet<String>>,
    key: String,
}

impl InFlight {
    fn acquire(set: &Arc<DashSet<String>>, key: String) -> AppResult<Self> {
        if !set.insert(key.clone()) {
            return Err(AppError::busy(&key));
        }
        Ok(Self {
            set: set.clone(),
            key,
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

/// CRUD controller for one resource
pub struct ResourceController<R: Resource> {
    repo: Arc<dyn Repository<R>>,
    store: Arc<RwLock<Collection<R>>>,
    tracker: Arc<RequestTracker>,
    in_flight: Arc<DashSet<String>>,
    notices: NoticeBoard,
    expired: Arc<AtomicBool>,
}

impl<R: Resource> Clone for ResourceController<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: self.store.clone(),
            tracker: self.tracker.clone(),
            in_flight: self.in_flight.clone(),
            notices: self.notices.clone(),
            expired: self.expired.clone(),
        }
    }
}

impl<R: Resource> ResourceController<R> {
    pub fn new(repo: Arc<dyn Repository<R>>, notices: NoticeBoard) -> Self {
        Self {
            repo,
            store: Arc::new(RwLock::new(Collection::new())),
            tracker: Arc::new(RequestTracker::new()),
            in_flight: Arc::new(DashSet::new()),
            notices,
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a session-expiry flag, raised on any `Unauthorized` response
    pub fn with_expiry_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.expired = flag;
        self
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    fn fail(&self, op: &str, err: AppError) -> AppError {
        if err.kind == ErrorKind::Unauthorized {
            self.expired.store(true, Ordering::SeqCst);
        }
        tracing::warn!(resource = R::NAME, op, kind = %err.kind, message = %err.message, "operation failed");
        self.notices.error(&err);
        err
    }

    // ========== Fetch ==========

    /// Reload the whole collection
    ///
    /// A newer refresh cancels this one; its result is then dropped and
    /// `Superseded` is returned without a notice.
    pub async fn refresh(&self) -> AppResult<usize> {
        // Ticket order and cancellation order must agree
        let (ticket, cancel) = {
            let mut store = self.store.write().await;
            (store.begin_fetch(), self.tracker.start())
        };

        let result = tokio::select! {
            result = self.repo.list() => result,
            _ = cancel.cancelled() => Err(AppError::superseded()),
        };

        let outcome = self.store.write().await.resolve_fetch(ticket, result);
        match outcome {
            FetchOutcome::Applied(count) => {
                tracing::debug!(resource = R::NAME, count, "collection loaded");
                Ok(count)
            }
            FetchOutcome::Rejected(err) => Err(self.fail("list", err)),
            FetchOutcome::Superseded => Err(AppError::superseded()),
        }
    }

    // ========== Mutations ==========

    /// Create a record and append it to the collection
    pub async fn create(&self, payload: R::Create) -> AppResult<R> {
        if R::READ_ONLY {
            return Err(self.fail("create", read_only::<R>()));
        }
        R::validate_create(&payload).map_err(|e| self.fail("create", e))?;

        let key = serde_json::to_string(&payload)
            .map(|body| format!("new:{body}"))
            .map_err(|e| self.fail("create", AppError::validation(e.to_string())))?;
        let _guard = InFlight::acquire(&self.in_flight, key).map_err(|e| self.fail("create", e))?;

        let created = self
            .repo
            .create(&payload)
            .await
            .map_err(|e| self.fail("create", e))?;

        if let Err(e) = self.store.write().await.apply_created(created.clone()) {
            tracing::warn!(resource = R::NAME, error = %e, "created record already present");
        }
        self.notices
            .success(format!("{} created", capitalize(R::NAME)));
        Ok(created)
    }

    /// Update a record that is present in the collection
    pub async fn update(&self, id: &str, payload: R::Update) -> AppResult<R> {
        if R::READ_ONLY {
            return Err(self.fail("update", read_only::<R>()));
        }
        R::validate_update(&payload).map_err(|e| self.fail("update", e))?;

        let current = self
            .store
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| self.fail("update", AppError::missing(R::NAME, id)))?;
        // The patch must still describe a well-formed record
        current
            .merged(&payload)
            .map_err(|e| self.fail("update", e))?;

        let _guard =
            InFlight::acquire(&self.in_flight, id.to_string()).map_err(|e| self.fail("update", e))?;

        let updated = self
            .repo
            .update(id, &payload)
            .await
            .map_err(|e| self.fail("update", e))?;

        if let Err(e) = self.store.write().await.apply_updated(updated.clone()) {
            tracing::warn!(resource = R::NAME, error = %e, "updated record left the collection");
        }
        self.notices
            .success(format!("{} updated", capitalize(R::NAME)));
        Ok(updated)
    }

    /// Delete a record that is present in the collection
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if R::READ_ONLY {
            return Err(self.fail("delete", read_only::<R>()));
        }
        if !self.store.read().await.contains(id) {
            return Err(self.fail("delete", AppError::missing(R::NAME, id)));
        }

        let _guard =
            InFlight::acquire(&self.in_flight, id.to_string()).map_err(|e| self.fail("delete", e))?;

        self.repo
            .delete(id)
            .await
            .map_err(|e| self.fail("delete", e))?;

        if let Err(e) = self.store.write().await.apply_deleted(id) {
            tracing::warn!(resource = R::NAME, error = %e, "deleted record already gone");
        }
        self.notices
            .success(format!("{} deleted", capitalize(R::NAME)));
        Ok(())
    }

    /// Run a create, update or delete
    ///
    /// Returns the stored record, or `None` for deletes.
    pub async fn dispatch(&self, action: CrudAction<R::Create, R::Update>) -> AppResult<Option<R>> {
        tracing::debug!(resource = R::NAME, op = action.verb(), target = ?action.target(), "dispatch");
        match action {
            CrudAction::Create(payload) => self.create(payload).await.map(Some),
            CrudAction::Update { id, data } => self.update(&id, data).await.map(Some),
            CrudAction::Delete { id } => self.delete(&id).await.map(|_| None),
        }
    }

    // ========== Reads ==========

    pub async fn get(&self, id: &str) -> Option<R> {
        self.store.read().await.get(id).cloned()
    }

    /// Records in collection order
    pub async fn snapshot(&self) -> Vec<R> {
        self.store.read().await.to_vec()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn status(&self) -> RequestStatus {
        self.store.read().await.status()
    }

    pub async fn error(&self) -> Option<AppError> {
        self.store.read().await.error().cloned()
    }

    /// One page of the list
    pub async fn view(&self, query: &ListQuery) -> ListView<R> {
        let store = self.store.read().await;
        query.apply(store.items())
    }

    /// CSV of every record the query selects
    pub async fn export_csv(&self, query: &ListQuery) -> String {
        let store = self.store.read().await;
        csv::export(query, store.items())
    }

    /// Cancel pending fetches and empty the collection
    pub async fn clear(&self) {
        self.tracker.cancel_all();
        self.store.write().await.clear();
    }
}

fn read_only<R: Resource>() -> AppError {
    AppError::forbidden(format!("{} records are read-only", capitalize(R::NAME)))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
