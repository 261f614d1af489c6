//! Transaction attribute policies.
//!
//! Each policy decides, against the manager's current state, whether to
//! join, start, suspend or refuse a transaction (`begin`), and what to do
//! once the method returned (`finish`).

use std::fmt;
use std::sync::Arc;

use ormwire_core::{Error, Result, TransactionErrorKind};
use tracing::warn;

use crate::manager::{Transaction, TransactionManager, TransactionStatus};

/// The implemented propagation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionAttribute {
    /// Join the current transaction or start one
    Required,
    /// Always start a new transaction, suspending the current one
    RequiresNew,
    /// Join the current transaction; fail without one
    Mandatory,
    /// Join the current transaction if there is one
    Supports,
    /// Fail if a transaction is active
    Never,
}

impl TransactionAttribute {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionAttribute::Required => "REQUIRED",
            TransactionAttribute::RequiresNew => "REQUIRES_NEW",
            TransactionAttribute::Mandatory => "MANDATORY",
            TransactionAttribute::Supports => "SUPPORTS",
            TransactionAttribute::Never => "NEVER",
        }
    }

    /// Apply the policy before the method runs.
    pub fn begin(self, manager: &dyn TransactionManager) -> Result<TransactionToken> {
        match self {
            TransactionAttribute::Required => {
                if manager.status()? == TransactionStatus::NoTransaction {
                    manager.begin()?;
                    Ok(TransactionToken::new(manager.transaction()?, None, self, true))
                } else {
                    Ok(TransactionToken::new(manager.transaction()?, None, self, false))
                }
            }
            TransactionAttribute::RequiresNew => {
                let suspended = if manager.status()? == TransactionStatus::Active {
                    manager.suspend()?
                } else {
                    None
                };
                match manager.begin().and_then(|()| manager.transaction()) {
                    Ok(active) => Ok(TransactionToken::new(active, suspended, self, true)),
                    Err(err) => {
                        if let Some(transaction) = suspended {
                            resume_after_failure(manager, transaction);
                        }
                        Err(err)
                    }
                }
            }
            TransactionAttribute::Mandatory => {
                if manager.status()? == TransactionStatus::NoTransaction {
                    return Err(Error::transaction(
                        TransactionErrorKind::IllegalState,
                        "No transaction is active for a MANDATORY method",
                    ));
                }
                Ok(TransactionToken::new(manager.transaction()?, None, self, false))
            }
            TransactionAttribute::Supports => {
                if manager.status()? == TransactionStatus::Active {
                    Ok(TransactionToken::new(manager.transaction()?, None, self, false))
                } else {
                    Ok(TransactionToken::new(None, None, self, false))
                }
            }
            TransactionAttribute::Never => {
                if manager.status()? == TransactionStatus::Active {
                    return Err(Error::transaction(
                        TransactionErrorKind::IllegalState,
                        "A transaction is active for a NEVER method",
                    ));
                }
                Ok(TransactionToken::new(None, None, self, false))
            }
        }
    }

    /// Apply the policy after the method ran, consuming the token.
    ///
    /// A token that owns its transaction commits it, or rolls it back when
    /// it was marked rollback-only. A suspended transaction is resumed even
    /// when completion failed.
    pub fn finish(self, manager: &dyn TransactionManager, token: TransactionToken) -> Result<()> {
        match self {
            TransactionAttribute::Required => {
                if token.completion_allowed {
                    complete(manager)
                } else {
                    Ok(())
                }
            }
            TransactionAttribute::RequiresNew => {
                let completed = if token.completion_allowed {
                    complete(manager)
                } else {
                    Ok(())
                };
                let Some(suspended) = token.suspended else {
                    return completed;
                };
                match (completed, manager.resume(suspended)) {
                    (Ok(()), resumed) => resumed,
                    (Err(err), Ok(())) => Err(err),
                    (Err(err), Err(resume_err)) => {
                        warn!(error = %resume_err, "Failed to resume suspended transaction");
                        Err(err)
                    }
                }
            }
            TransactionAttribute::Mandatory
            | TransactionAttribute::Supports
            | TransactionAttribute::Never => Ok(()),
        }
    }
}

impl fmt::Display for TransactionAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn complete(manager: &dyn TransactionManager) -> Result<()> {
    if manager.status()? == TransactionStatus::MarkedRollback {
        manager.rollback()
    } else {
        manager.commit()
    }
}

fn resume_after_failure(manager: &dyn TransactionManager, transaction: Arc<dyn Transaction>) {
    if let Err(err) = manager.resume(transaction) {
        warn!(error = %err, "Failed to resume suspended transaction");
    }
}

/// State handed from `begin` to `finish` for one invocation.
#[derive(Debug)]
pub struct TransactionToken {
    active: Option<Arc<dyn Transaction>>,
    suspended: Option<Arc<dyn Transaction>>,
    attribute: TransactionAttribute,
    completion_allowed: bool,
}

impl TransactionToken {
    pub fn new(
        active: Option<Arc<dyn Transaction>>,
        suspended: Option<Arc<dyn Transaction>>,
        attribute: TransactionAttribute,
        completion_allowed: bool,
    ) -> Self {
        Self {
            active,
            suspended,
            attribute,
            completion_allowed,
        }
    }

    /// The transaction the method runs in, if any.
    pub fn active_transaction(&self) -> Option<&Arc<dyn Transaction>> {
        self.active.as_ref()
    }

    pub fn suspended_transaction(&self) -> Option<&Arc<dyn Transaction>> {
        self.suspended.as_ref()
    }

    pub const fn attribute(&self) -> TransactionAttribute {
        self.attribute
    }

    /// Does this invocation commit or roll back the transaction itself?
    pub const fn is_completion_allowed(&self) -> bool {
        self.completion_allowed
    }

    /// Finish with the attribute that created this token.
    pub fn finish(self, manager: &dyn TransactionManager) -> Result<()> {
        self.attribute.finish(manager, self)
    }
}
