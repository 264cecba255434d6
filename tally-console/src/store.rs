//! Remote collection store
//!
//! 每个资源一个 [`Collection`]：按 ID 索引、保持插入顺序，
//! 记录最近一次请求的状态与错误。
//!
//! Fetch results are only applied when they belong to the latest request
//! started and no local mutation has landed since that request began.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared::models::Resource;
use shared::{AppError, AppResult, ErrorKind};
use thiserror::Error;

/// Lifecycle of the last fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Handle for one started fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// What [`Collection::resolve_fetch`] did with a result
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The collection now holds this many records
    Applied(usize),
    /// The fetch failed; previous records were kept
    Rejected(AppError),
    /// A newer request or a local mutation made this result stale
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{resource} {id} not found")]
    Missing { resource: &'static str, id: String },

    #[error("{resource} {id} already exists")]
    DuplicateKey { resource: &'static str, id: String },
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing { resource, id } => AppError::missing(resource, &id),
            StoreError::DuplicateKey { resource, id } => AppError::with_message(
                ErrorKind::InvalidResponse,
                format!("{resource} {id} already exists"),
            )
            .with_detail("resource", resource)
            .with_detail("id", id),
        }
    }
}

/// Keyed, insertion-ordered collection of one resource
#[derive(Debug, Clone)]
pub struct Collection<R: Resource> {
    items: IndexMap<String, R>,
    status: RequestStatus,
    error: Option<AppError>,
    /// Logical clock, bumped by every fetch start and every mutation
    clock: u64,
    latest_fetch: u64,
    last_mutation: u64,
}

impl<R: Resource> Default for Collection<R> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            status: RequestStatus::Idle,
            error: None,
            clock: 0,
            latest_fetch: 0,
            last_mutation: 0,
        }
    }
}

impl<R: Resource> Collection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection pre-filled with `items`, as after a successful fetch
    pub fn with_items(items: Vec<R>) -> Self {
        let mut collection = Self::new();
        collection.replace_all(items);
        collection.status = RequestStatus::Fulfilled;
        collection
    }

    // ========== Fetch lifecycle ==========

    /// Mark a fetch as started
    pub fn begin_fetch(&mut self) -> RequestTicket {
        self.clock += 1;
        self.latest_fetch = self.clock;
        self.status = RequestStatus::Pending;
        RequestTicket(self.clock)
    }

    /// Whether a result for `ticket` would still be applied
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest_fetch && ticket.0 > self.last_mutation
    }

    /// Apply the result of the fetch identified by `ticket`
    pub fn resolve_fetch(
        &mut self,
        ticket: RequestTicket,
        result: AppResult<Vec<R>>,
    ) -> FetchOutcome {
        if !self.is_current(ticket) {
            // 最新的请求被本地变更抢先：数据保持不变，状态回到已完成
            if ticket.0 == self.latest_fetch && self.status == RequestStatus::Pending {
                self.status = RequestStatus::Fulfilled;
            }
            tracing::debug!(
                resource = R::NAME,
                ticket = ticket.0,
                latest = self.latest_fetch,
                "dropping superseded fetch"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(items) => {
                self.replace_all(items);
                self.status = RequestStatus::Fulfilled;
                self.error = None;
                FetchOutcome::Applied(self.items.len())
            }
            Err(err) => {
                self.status = RequestStatus::Rejected;
                self.error = Some(err.clone());
                FetchOutcome::Rejected(err)
            }
        }
    }

    fn replace_all(&mut self, items: Vec<R>) {
        let total = items.len();
        self.items = items
            .into_iter()
            .map(|item| (item.key().to_string(), item))
            .collect();
        if self.items.len() != total {
            tracing::warn!(
                resource = R::NAME,
                received = total,
                kept = self.items.len(),
                "server returned duplicate identifiers"
            );
        }
    }

    fn touch(&mut self) {
        self.clock += 1;
        self.last_mutation = self.clock;
    }

    // ========== Mutations ==========

    /// Append a record returned by a create request
    pub fn apply_created(&mut self, item: R) -> Result<(), StoreError> {
        let key = item.key().to_string();
        if self.items.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                resource: R::NAME,
                id: key,
            });
        }
        self.items.insert(key, item);
        self.touch();
        Ok(())
    }

    /// Replace the record with the same identifier, keeping its position
    pub fn apply_updated(&mut self, item: R) -> Result<(), StoreError> {
        match self.items.get_mut(item.key()) {
            Some(slot) => {
                *slot = item;
                self.touch();
                Ok(())
            }
            None => Err(StoreError::Missing {
                resource: R::NAME,
                id: item.key().to_string(),
            }),
        }
    }

    /// Remove the record with identifier `id`
    pub fn apply_deleted(&mut self, id: &str) -> Result<R, StoreError> {
        match self.items.shift_remove(id) {
            Some(removed) => {
                self.touch();
                Ok(removed)
            }
            None => Err(StoreError::Missing {
                resource: R::NAME,
                id: id.to_string(),
            }),
        }
    }

    /// Drop everything, as on logout
    pub fn clear(&mut self) {
        self.items.clear();
        self.status = RequestStatus::Idle;
        self.error = None;
        self.touch();
    }

    // ========== Queries ==========

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Records in insertion order
    pub fn items(&self) -> impl ExactSizeIterator<Item = &R> + '_ {
        self.items.values()
    }

    /// Owned copy of the records in insertion order
    pub fn to_vec(&self) -> Vec<R> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }
}
