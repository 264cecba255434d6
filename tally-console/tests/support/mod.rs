//! 测试辅助: 内存仓库与样例数据

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use shared::models::{Admin, Product, Resource};
use shared::{AppError, AppResult, ErrorKind};
use tally_client::Repository;
use tokio::sync::Notify;

/// Pause point for the next repository call
#[derive(Clone, Default)]
pub struct Hold {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

type Builder<R> = Box<dyn Fn(&<R as Resource>::Create, usize) -> R + Send + Sync>;

/// Repository backed by a vector, standing in for the backend
pub struct MemoryRepo<R: Resource> {
    records: Mutex<Vec<R>>,
    build: Builder<R>,
    calls: AtomicUsize,
    hold: Mutex<Option<Hold>>,
    fail_next: Mutex<Option<AppError>>,
}

impl<R: Resource> MemoryRepo<R> {
    pub fn new(
        records: Vec<R>,
        build: impl Fn(&R::Create, usize) -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            records: Mutex::new(records),
            build: Box::new(build),
            calls: AtomicUsize::new(0),
            hold: Mutex::new(None),
            fail_next: Mutex::new(None),
        }
    }

    /// Repository whose create is never expected to run
    pub fn seeded(records: Vec<R>) -> Self {
        Self::new(records, |_, _| panic!("unexpected create"))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next call wait until `release` is notified
    pub fn hold_next(&self) -> Hold {
        let hold = Hold::default();
        *self.hold.lock() = Some(hold.clone());
        hold
    }

    pub fn fail_next(&self, err: AppError) {
        *self.fail_next.lock() = Some(err);
    }

    pub fn records(&self) -> Vec<R> {
        self.records.lock().clone()
    }

    pub fn set_records(&self, records: Vec<R>) {
        *self.records.lock() = records;
    }

    async fn gate(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hold = self.hold.lock().take();
        if let Some(hold) = hold {
            hold.started.notify_one();
            hold.release.notified().await;
        }
        let failure = self.fail_next.lock().take();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> AppError {
        AppError::with_message(ErrorKind::NotFound, format!("{} {id} does not exist", R::NAME))
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for MemoryRepo<R> {
    async fn list(&self) -> AppResult<Vec<R>> {
        self.gate().await?;
        Ok(self.records())
    }

    async fn get(&self, id: &str) -> AppResult<R> {
        self.gate().await?;
        self.records
            .lock()
            .iter()
            .find(|r| r.key() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, payload: &R::Create) -> AppResult<R> {
        self.gate().await?;
        let mut records = self.records.lock();
        let record = (self.build)(payload, records.len() + 1);
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, payload: &R::Update) -> AppResult<R> {
        self.gate().await?;
        let mut records = self.records.lock();
        let index = records
            .iter()
            .position(|r| r.key() == id)
            .ok_or_else(|| Self::not_found(id))?;
        let updated = records[index].merged(payload)?;
        records[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.gate().await?;
        let mut records = self.records.lock();
        let index = records
            .iter()
            .position(|r| r.key() == id)
            .ok_or_else(|| Self::not_found(id))?;
        records.remove(index);
        Ok(())
    }
}

// ========== Fixtures ==========

pub fn admin(uuid: &str, first_name: &str, salary: i64) -> Admin {
    serde_json::from_value(json!({
        "uuid": uuid,
        "first_name": first_name,
        "last_name": "Test",
        "username": uuid,
        "role": "admin",
        "salary": salary,
        "permissions": ["products"],
    }))
    .unwrap()
}

pub fn product(id: &str, name: &str, quantity: i64, sell_price: &str) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "net_price": 1,
        "sell_price": sell_price.parse::<f64>().unwrap(),
        "cost_price": 1,
        "quantity": quantity,
        "min_quantity": 3,
    }))
    .unwrap()
}

pub fn products() -> Vec<Product> {
    vec![
        product("p1", "Cola", 12, "1.5"),
        product("p2", "tea", 0, "2"),
        product("p3", "Apple juice", 3, "10"),
        product("p4", "biscuits", 40, "0.75"),
        product("p5", "Candy", 2, "10"),
    ]
}
