//! Run-control invariant tests
//!
//! Invariants:
//! - Idempotency: a status record from today short-circuits the run; no
//!   server is contacted, no staging happens, the record is not rewritten.
//! - Mutual exclusion: while the lock is held, a second invocation exits
//!   cleanly without touching scratch directories or the status record.
//! - The status record is overwritten at the end of every completed pass.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local};
use tempfile::TempDir;

use restorecheck::catalog::{
    BackupRecord, BackupStatus, CatalogReader, CatalogResult, GlobalConfig, GlobalSection,
    InventorySnapshot, ServerConfig, ServerRecord, WalSegmentId,
};
use restorecheck::coordinator::{
    Coordinator, ExclusionLock, RunOutcome, RunStatusRecord, StatusStore, VerifyPipeline,
    SUCCESS_MESSAGE,
};
use restorecheck::instance::{InstanceController, InstanceError};
use restorecheck::poll::{Pause, ProbeOutcome, ReadinessProbe};
use restorecheck::staging::{
    ConfigPatcher, DataSyncer, StagingContext, StagingResult, WalLinker,
};

// =============================================================================
// Test Utilities
// =============================================================================

struct FakeCatalog {
    snapshot: InventorySnapshot,
    fetches: RefCell<u32>,
}

impl FakeCatalog {
    fn new(snapshot: InventorySnapshot) -> Self {
        Self {
            snapshot,
            fetches: RefCell::new(0),
        }
    }
}

impl CatalogReader for FakeCatalog {
    fn fetch(&self) -> CatalogResult<InventorySnapshot> {
        *self.fetches.borrow_mut() += 1;
        Ok(self.snapshot.clone())
    }
}

/// Every capability in one fake that counts how often staging was touched.
struct CountingStack {
    touches: RefCell<u32>,
}

impl CountingStack {
    fn new() -> Self {
        Self {
            touches: RefCell::new(0),
        }
    }
}

impl DataSyncer for CountingStack {
    fn sync(&self, _from: &Path, _to: &Path) -> StagingResult<()> {
        *self.touches.borrow_mut() += 1;
        Ok(())
    }
}

impl WalLinker for CountingStack {
    fn link_dir(&self, _source: &Path, _dest: &Path) -> StagingResult<()> {
        *self.touches.borrow_mut() += 1;
        Ok(())
    }
}

impl ConfigPatcher for CountingStack {
    fn patch(&self, _ctx: &StagingContext) -> StagingResult<()> {
        *self.touches.borrow_mut() += 1;
        Ok(())
    }
}

impl InstanceController for CountingStack {
    fn start(&self, _ctx: &StagingContext) -> Result<(), InstanceError> {
        *self.touches.borrow_mut() += 1;
        Ok(())
    }

    fn stop(&self, _ctx: &StagingContext) -> Result<(), InstanceError> {
        *self.touches.borrow_mut() += 1;
        Ok(())
    }
}

impl ReadinessProbe for CountingStack {
    fn probe(&self, _conninfo: &str) -> ProbeOutcome {
        *self.touches.borrow_mut() += 1;
        ProbeOutcome::Ready
    }
}

impl Pause for CountingStack {
    fn pause(&self, _interval: Duration) {}
}

struct MemoryStatusStore {
    record: RefCell<Option<RunStatusRecord>>,
    writes: RefCell<u32>,
}

impl MemoryStatusStore {
    fn with_record(record: Option<RunStatusRecord>) -> Self {
        Self {
            record: RefCell::new(record),
            writes: RefCell::new(0),
        }
    }
}

impl StatusStore for MemoryStatusStore {
    fn load(&self) -> Option<RunStatusRecord> {
        self.record.borrow().clone()
    }

    fn store(&self, record: &RunStatusRecord) -> std::io::Result<()> {
        *self.writes.borrow_mut() += 1;
        *self.record.borrow_mut() = Some(record.clone());
        Ok(())
    }
}

fn one_server_snapshot(root: &Path) -> InventorySnapshot {
    let backup = BackupRecord {
        status: BackupStatus::Done,
        begin_wal: WalSegmentId::parse("000000010000000200000000").unwrap(),
        end_wal: WalSegmentId::parse("000000010000000300000000").unwrap(),
        version: 90409,
    };
    let server = ServerRecord {
        config: ServerConfig {
            conninfo: "host=db.example.org user=postgres".to_string(),
        },
        backups: BTreeMap::from([(
            format!("{}T010203", Local::now().format("%Y%m%d")),
            backup,
        )]),
    };
    InventorySnapshot {
        global: GlobalSection {
            config: GlobalConfig {
                barman_home: root.to_path_buf(),
                log_file: root.join("catalog.log"),
            },
        },
        servers: BTreeMap::from([("main".to_string(), server)]),
    }
}

fn coordinator<'a>(
    catalog: &'a FakeCatalog,
    stack: &'a CountingStack,
    store: &'a MemoryStatusStore,
    lock_path: &Path,
) -> Coordinator<'a> {
    Coordinator {
        catalog,
        pipeline: VerifyPipeline {
            syncer: stack,
            linker: stack,
            patcher: stack,
            controller: stack,
            probe: stack,
            pause: stack,
            poll_budget: Some((3, Duration::from_secs(0))),
        },
        status_store: store,
        lock_path: lock_path.to_path_buf(),
    }
}

// =============================================================================
// INVARIANT: already checked today ⇒ no work, record untouched
// =============================================================================

#[test]
fn test_second_run_of_the_day_is_a_no_op() {
    let root = TempDir::new().unwrap();
    let catalog = FakeCatalog::new(one_server_snapshot(root.path()));
    let stack = CountingStack::new();

    let now = Local::now();
    let earlier_today = RunStatusRecord {
        timestamp: now.timestamp() as f64,
        status: 0,
        message: SUCCESS_MESSAGE.to_string(),
    };
    let store = MemoryStatusStore::with_record(Some(earlier_today.clone()));

    let lock_path = root.path().join("restorecheck.lock");
    let outcome = coordinator(&catalog, &stack, &store, &lock_path)
        .run(now)
        .unwrap();

    assert_eq!(outcome, RunOutcome::AlreadyChecked);
    // One snapshot fetch (needed to init logging), then nothing.
    assert_eq!(*catalog.fetches.borrow(), 1);
    assert_eq!(*stack.touches.borrow(), 0);
    assert_eq!(*store.writes.borrow(), 0);
    assert_eq!(store.load().unwrap(), earlier_today);
}

#[test]
fn test_yesterdays_record_does_not_block_todays_run() {
    let root = TempDir::new().unwrap();
    let catalog = FakeCatalog::new(one_server_snapshot(root.path()));
    let stack = CountingStack::new();

    let now = Local::now();
    let yesterday = RunStatusRecord {
        timestamp: (now - ChronoDuration::hours(24)).timestamp() as f64,
        status: 1,
        message: "Clusters with failed backups are main. Take a look at them.".to_string(),
    };
    let store = MemoryStatusStore::with_record(Some(yesterday));

    let lock_path = root.path().join("restorecheck.lock");
    let outcome = coordinator(&catalog, &stack, &store, &lock_path)
        .run(now)
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            status: 0,
            failed: vec![]
        }
    );
    assert!(*stack.touches.borrow() > 0);
    assert_eq!(*store.writes.borrow(), 1);
    assert_eq!(store.load().unwrap().message, SUCCESS_MESSAGE);
}

// =============================================================================
// INVARIANT: exclusion lock held ⇒ clean exit, nothing touched
// =============================================================================

#[test]
fn test_run_yields_while_lock_is_held() {
    let root = TempDir::new().unwrap();
    let lock_path = root.path().join("restorecheck.lock");

    let catalog = FakeCatalog::new(one_server_snapshot(root.path()));
    let stack = CountingStack::new();
    let store = MemoryStatusStore::with_record(None);

    let _held = ExclusionLock::acquire(&lock_path).unwrap().unwrap();

    let outcome = coordinator(&catalog, &stack, &store, &lock_path)
        .run(Local::now())
        .unwrap();

    assert_eq!(outcome, RunOutcome::LockHeld);
    assert_eq!(*stack.touches.borrow(), 0);
    assert_eq!(*store.writes.borrow(), 0);
    assert!(store.load().is_none());
}

#[test]
fn test_lock_released_by_one_run_frees_the_next() {
    let root = TempDir::new().unwrap();
    let lock_path = root.path().join("restorecheck.lock");

    let catalog = FakeCatalog::new(one_server_snapshot(root.path()));
    let stack = CountingStack::new();
    let store = MemoryStatusStore::with_record(None);

    {
        let _held = ExclusionLock::acquire(&lock_path).unwrap().unwrap();
    }

    let outcome = coordinator(&catalog, &stack, &store, &lock_path)
        .run(Local::now())
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { status: 0, .. }));
}

// =============================================================================
// INVARIANT: a completed pass always overwrites the status record
// =============================================================================

#[test]
fn test_completed_pass_overwrites_stale_record() {
    let root = TempDir::new().unwrap();
    let catalog = FakeCatalog::new(one_server_snapshot(root.path()));
    let stack = CountingStack::new();

    let now = Local::now();
    let stale = RunStatusRecord {
        timestamp: (now - ChronoDuration::hours(30)).timestamp() as f64,
        status: 1,
        message: "Clusters with failed backups are old-server. Take a look at them.".to_string(),
    };
    let store = MemoryStatusStore::with_record(Some(stale));

    let lock_path = root.path().join("restorecheck.lock");
    coordinator(&catalog, &stack, &store, &lock_path)
        .run(now)
        .unwrap();

    let record = store.load().unwrap();
    assert_eq!(record.status, 0);
    assert_eq!(record.message, SUCCESS_MESSAGE);
    assert!(record.timestamp >= now.timestamp() as f64);
}
