//! In-crate repository double.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repository::{Repository, RepositoryError, Resource};

/// Vec-backed repository that counts calls and can simulate outages.
pub(crate) struct FakeRepository<R: Resource> {
    records: Mutex<Vec<R>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    calls: AtomicUsize,
    inserts: AtomicUsize,
}

impl<R: Resource> FakeRepository<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn enter(&self, write: bool) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = if write {
            self.fail_writes.load(Ordering::SeqCst)
        } else {
            self.fail_reads.load(Ordering::SeqCst)
        };
        if failing {
            Err(RepositoryError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for FakeRepository<R> {
    async fn list(&self, company: Option<Uuid>) -> Result<Vec<R>, RepositoryError> {
        self.enter(false)?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| r.visible_to(company)).cloned().collect())
    }

    async fn find(&self, company: Option<Uuid>, id: Uuid) -> Result<Option<R>, RepositoryError> {
        self.enter(false)?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.id() == id && r.visible_to(company))
            .cloned())
    }

    async fn count_for_company(&self, company_id: Uuid) -> Result<i64, RepositoryError> {
        self.enter(false)?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.company_id() == Some(company_id))
            .count() as i64)
    }

    async fn create(
        &self,
        company_id: Option<Uuid>,
        input: &R::Create,
    ) -> Result<R, RepositoryError> {
        self.enter(true)?;
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let record = R::materialize(Uuid::new_v4(), company_id, input, Utc::now());
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        company: Option<Uuid>,
        id: Uuid,
        input: &R::Update,
    ) -> Result<Option<R>, RepositoryError> {
        self.enter(true)?;
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id() == id && r.visible_to(company))
        {
            Some(record) => {
                record.apply_update(input, Utc::now());
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, company: Option<Uuid>, id: Uuid) -> Result<bool, RepositoryError> {
        self.enter(true)?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id() == id && r.visible_to(company)));
        Ok(records.len() != before)
    }
}
