#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashSet, VecDeque},
    path::PathBuf,
    rc::Rc,
    sync::Mutex,
};

use chrono::NaiveDate;
use ledger_history::{
    domain::{AccountKind, AccountRecord, EntityKind, Record, TransactionKind, TransactionRecord},
    errors::{StoreError, StoreResult},
    EntityStore, LedgerStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Shared switches controlling when a [`FlakyStore`] refuses writes.
#[derive(Default)]
pub struct Faults {
    /// Write calls (1-based, counted across create/update/delete) that fail.
    failing_writes: HashSet<usize>,
    /// Errors returned by the next writes, in order, before counting resumes.
    queued: VecDeque<StoreError>,
    writes: usize,
    offline: bool,
}

impl Faults {
    pub fn fail_write(&mut self, call: usize) {
        self.failing_writes.insert(call);
    }

    pub fn fail_next(&mut self, error: StoreError) {
        self.queued.push_back(error);
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    fn next_write(&mut self) -> StoreResult<()> {
        if self.offline {
            return Err(StoreError::Unavailable);
        }
        if let Some(error) = self.queued.pop_front() {
            return Err(error);
        }
        self.writes += 1;
        if self.failing_writes.contains(&self.writes) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

/// In-memory store whose writes can be made to fail on demand, while the
/// test keeps a handle to both the faults and the underlying ledger.
pub struct FlakyStore {
    inner: Rc<RefCell<LedgerStore>>,
    faults: Rc<RefCell<Faults>>,
}

pub struct FlakyHandle {
    pub inner: Rc<RefCell<LedgerStore>>,
    pub faults: Rc<RefCell<Faults>>,
}

impl FlakyHandle {
    pub fn get(&self, kind: EntityKind, id: Uuid) -> StoreResult<Record> {
        self.inner.borrow().get(kind, id)
    }

    pub fn exists(&self, kind: EntityKind, id: Uuid) -> bool {
        self.inner
            .borrow()
            .exists(kind, id)
            .expect("in-memory store is available")
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.inner.borrow().ledger().count(kind)
    }
}

pub fn flaky_store() -> (FlakyStore, FlakyHandle) {
    let inner = Rc::new(RefCell::new(LedgerStore::in_memory("Flaky")));
    let faults = Rc::new(RefCell::new(Faults::default()));
    let handle = FlakyHandle {
        inner: Rc::clone(&inner),
        faults: Rc::clone(&faults),
    };
    (FlakyStore { inner, faults }, handle)
}

impl EntityStore for FlakyStore {
    fn is_available(&self) -> bool {
        !self.faults.borrow().offline
    }

    fn get(&self, kind: EntityKind, id: Uuid) -> StoreResult<Record> {
        if self.faults.borrow().offline {
            return Err(StoreError::Unavailable);
        }
        self.inner.borrow().get(kind, id)
    }

    fn list(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        self.inner.borrow().list(kind)
    }

    fn create(&mut self, kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()> {
        self.faults.borrow_mut().next_write()?;
        self.inner.borrow_mut().create(kind, id, record)
    }

    fn update(&mut self, kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()> {
        self.faults.borrow_mut().next_write()?;
        self.inner.borrow_mut().update(kind, id, record)
    }

    fn delete(&mut self, kind: EntityKind, id: Uuid, soft: bool) -> StoreResult<()> {
        self.faults.borrow_mut().next_write()?;
        self.inner.borrow_mut().delete(kind, id, soft)
    }
}

pub fn account(name: &str) -> AccountRecord {
    AccountRecord::new(name, AccountKind::Bank)
}

pub fn expense(account_id: Uuid, amount: f64, description: &str) -> TransactionRecord {
    TransactionRecord::new(
        account_id,
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        amount,
        TransactionKind::Expense,
        description,
    )
}
