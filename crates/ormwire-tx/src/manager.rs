//! Collaborator traits for an external transaction manager.
//!
//! The manager owns the thread-associated transaction; implementations use
//! interior mutability, so every operation takes `&self`.

use std::fmt;
use std::sync::Arc;

use ormwire_core::Result;

/// Status of a transaction as reported by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Active,
    MarkedRollback,
    Prepared,
    Committed,
    RolledBack,
    Unknown,
    NoTransaction,
    Preparing,
    Committing,
    RollingBack,
}

impl TransactionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Active => "ACTIVE",
            TransactionStatus::MarkedRollback => "MARKED_ROLLBACK",
            TransactionStatus::Prepared => "PREPARED",
            TransactionStatus::Committed => "COMMITTED",
            TransactionStatus::RolledBack => "ROLLEDBACK",
            TransactionStatus::Unknown => "UNKNOWN",
            TransactionStatus::NoTransaction => "NO_TRANSACTION",
            TransactionStatus::Preparing => "PREPARING",
            TransactionStatus::Committing => "COMMITTING",
            TransactionStatus::RollingBack => "ROLLING_BACK",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource (typically a session's connection) taking part in a transaction.
pub trait TransactionalResource: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// One transaction owned by the manager.
pub trait Transaction: Send + Sync + fmt::Debug {
    /// Identifier shared by every branch of this transaction.
    fn global_id(&self) -> String;

    fn status(&self) -> Result<TransactionStatus>;

    fn enlist_resource(&self, resource: Box<dyn TransactionalResource>) -> Result<()>;

    fn set_rollback_only(&self) -> Result<()>;
}

/// Thread-associated transaction manager.
pub trait TransactionManager: Send + Sync {
    /// Start a transaction and associate it with the current thread.
    fn begin(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    fn status(&self) -> Result<TransactionStatus>;

    /// The transaction associated with the current thread, if any.
    fn transaction(&self) -> Result<Option<Arc<dyn Transaction>>>;

    /// Detach the current transaction from the thread.
    fn suspend(&self) -> Result<Option<Arc<dyn Transaction>>>;

    fn resume(&self, transaction: Arc<dyn Transaction>) -> Result<()>;

    fn set_rollback_only(&self) -> Result<()>;
}

/// Supplies a fresh resource for every transactional invocation.
pub trait ResourceProvider: Send + Sync {
    fn resource(&self) -> Result<Box<dyn TransactionalResource>>;
}

impl<F> ResourceProvider for F
where
    F: Fn() -> Result<Box<dyn TransactionalResource>> + Send + Sync,
{
    fn resource(&self) -> Result<Box<dyn TransactionalResource>> {
        self()
    }
}
