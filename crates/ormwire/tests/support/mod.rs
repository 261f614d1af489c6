//! Shared fixtures: in-memory data source and a recording transaction manager.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use ormwire::prelude::*;
use ormwire::TransactionErrorKind;

/// Data source reporting a fixed product name, or failing.
#[derive(Debug)]
pub struct StaticDataSource {
    product: Option<&'static str>,
}

impl StaticDataSource {
    pub fn new(product: &'static str) -> Arc<Self> {
        Arc::new(Self {
            product: Some(product),
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self { product: None })
    }
}

impl DataSource for StaticDataSource {
    fn product_name(&self) -> Result<String> {
        self.product
            .map(str::to_string)
            .ok_or_else(|| Error::Custom("data source offline".to_string()))
    }
}

/// Environment named `test` over `data_source`.
pub fn environment(data_source: Arc<dyn DataSource>) -> Environment {
    Environment::new("test", TransactionFactory::Jdbc, data_source)
}

/// Ordered log shared by the manager, its transactions, resources and targets.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[derive(Debug)]
struct RecordingTransaction {
    id: String,
    rollback_only: AtomicBool,
    recorder: Recorder,
}

impl Transaction for RecordingTransaction {
    fn global_id(&self) -> String {
        self.id.clone()
    }

    fn status(&self) -> Result<TransactionStatus> {
        if self.rollback_only.load(Ordering::SeqCst) {
            Ok(TransactionStatus::MarkedRollback)
        } else {
            Ok(TransactionStatus::Active)
        }
    }

    fn enlist_resource(&self, resource: Box<dyn TransactionalResource>) -> Result<()> {
        self.recorder
            .record(format!("enlist {} {}", resource.name(), self.id));
        Ok(())
    }

    fn set_rollback_only(&self) -> Result<()> {
        self.rollback_only.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Thread-associated manager that logs every operation.
pub struct RecordingManager {
    recorder: Recorder,
    current: Mutex<Option<Arc<dyn Transaction>>>,
    next_id: AtomicU32,
    pub fail_commit: AtomicBool,
}

impl RecordingManager {
    pub fn new(recorder: &Recorder) -> Arc<Self> {
        Arc::new(Self {
            recorder: recorder.clone(),
            current: Mutex::new(None),
            next_id: AtomicU32::new(0),
            fail_commit: AtomicBool::new(false),
        })
    }

    pub fn current_id(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.global_id())
    }

    fn take_current(&self, op: &str) -> Result<Arc<dyn Transaction>> {
        let tx = self.current.lock().unwrap().take().ok_or_else(|| {
            Error::transaction(
                TransactionErrorKind::IllegalState,
                format!("{op} without transaction"),
            )
        })?;
        self.recorder.record(format!("{op} {}", tx.global_id()));
        Ok(tx)
    }
}

impl TransactionManager for RecordingManager {
    fn begin(&self) -> Result<()> {
        let mut current = self.current.lock().unwrap();
        if current.is_some() {
            return Err(Error::transaction(
                TransactionErrorKind::NestedNotSupported,
                "nested transactions are not supported",
            ));
        }
        let id = format!("tx-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.recorder.record(format!("begin {id}"));
        *current = Some(Arc::new(RecordingTransaction {
            id,
            rollback_only: AtomicBool::new(false),
            recorder: self.recorder.clone(),
        }));
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let tx = self.take_current("commit")?;
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(Error::transaction(
                TransactionErrorKind::Heuristic,
                format!("heuristic rollback of {}", tx.global_id()),
            ));
        }
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.take_current("rollback").map(drop)
    }

    fn status(&self) -> Result<TransactionStatus> {
        match self.current.lock().unwrap().as_ref() {
            Some(tx) => tx.status(),
            None => Ok(TransactionStatus::NoTransaction),
        }
    }

    fn transaction(&self) -> Result<Option<Arc<dyn Transaction>>> {
        Ok(self.current.lock().unwrap().clone())
    }

    fn suspend(&self) -> Result<Option<Arc<dyn Transaction>>> {
        self.take_current("suspend").map(Some)
    }

    fn resume(&self, transaction: Arc<dyn Transaction>) -> Result<()> {
        self.recorder
            .record(format!("resume {}", transaction.global_id()));
        *self.current.lock().unwrap() = Some(transaction);
        Ok(())
    }

    fn set_rollback_only(&self) -> Result<()> {
        let current = self.current.lock().unwrap();
        let tx = current.as_ref().ok_or_else(|| {
            Error::transaction(TransactionErrorKind::IllegalState, "no transaction")
        })?;
        self.recorder
            .record(format!("set_rollback_only {}", tx.global_id()));
        tx.set_rollback_only()
    }
}

#[derive(Debug)]
struct Session(String);

impl TransactionalResource for Session {
    fn name(&self) -> &str {
        &self.0
    }
}

/// Provider opening `session-1`, `session-2`, ... and logging each open.
pub fn sessions(recorder: &Recorder) -> Arc<dyn ResourceProvider> {
    let recorder = recorder.clone();
    let opened = AtomicU32::new(0);
    Arc::new(move || -> Result<Box<dyn TransactionalResource>> {
        let name = format!("session-{}", opened.fetch_add(1, Ordering::SeqCst) + 1);
        recorder.record(format!("open {name}"));
        Ok(Box::new(Session(name)))
    })
}

/// Provider that cannot open sessions.
pub fn broken_sessions() -> Arc<dyn ResourceProvider> {
    Arc::new(|| -> Result<Box<dyn TransactionalResource>> {
        Err(Error::transaction(
            TransactionErrorKind::Enlist,
            "no session available",
        ))
    })
}
