//! Transaction demarcation around method invocations.

use std::fmt;
use std::sync::Arc;

use ormwire_core::{Error, Result};
use tracing::{debug, trace, warn};

use crate::attribute::{TransactionAttribute, TransactionToken};
use crate::manager::{ResourceProvider, TransactionManager};
use crate::transactional::MethodDescriptor;

/// Wraps methods in the transaction their descriptor asks for.
///
/// Without a transaction manager every method runs directly.
#[derive(Clone)]
pub struct TransactionalInterceptor {
    manager: Option<Arc<dyn TransactionManager>>,
    resources: Arc<dyn ResourceProvider>,
}

impl TransactionalInterceptor {
    pub fn new(manager: Arc<dyn TransactionManager>, resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            manager: Some(manager),
            resources,
        }
    }

    /// Interceptor that runs every method without transaction management.
    pub fn without_manager(resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            manager: None,
            resources,
        }
    }

    pub fn has_manager(&self) -> bool {
        self.manager.is_some()
    }

    /// Resolve the policy for `descriptor` once, for repeated invocations.
    pub fn bind(&self, descriptor: &MethodDescriptor) -> TransactionalMethod {
        let policy = match (&self.manager, descriptor.resolve()) {
            (Some(manager), Some(transactional)) => {
                transactional.propagation.attribute().map(|attribute| Policy {
                    attribute,
                    rollback_only: transactional.rollback_only,
                    manager: Arc::clone(manager),
                    resources: Arc::clone(&self.resources),
                })
            }
            _ => None,
        };
        TransactionalMethod {
            name: descriptor.qualified_name(),
            policy,
        }
    }

    /// Run `target` as the method described by `descriptor`.
    pub fn invoke<T, E, F>(&self, descriptor: &MethodDescriptor, target: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        self.bind(descriptor).invoke(target)
    }
}

impl fmt::Debug for TransactionalInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionalInterceptor")
            .field("has_manager", &self.has_manager())
            .finish_non_exhaustive()
    }
}

struct Policy {
    attribute: TransactionAttribute,
    rollback_only: bool,
    manager: Arc<dyn TransactionManager>,
    resources: Arc<dyn ResourceProvider>,
}

/// A method bound to its transaction policy.
pub struct TransactionalMethod {
    name: String,
    policy: Option<Policy>,
}

impl TransactionalMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The policy applied, or `None` when the method runs without a transaction.
    pub fn attribute(&self) -> Option<TransactionAttribute> {
        self.policy.as_ref().map(|p| p.attribute)
    }

    pub fn is_rollback_only(&self) -> bool {
        self.policy.as_ref().is_some_and(|p| p.rollback_only)
    }

    /// Run `target` inside the bound policy.
    ///
    /// Errors from `target` are returned unchanged after the transaction was
    /// marked rollback-only and finished. Failures of the transaction
    /// machinery are converted into `E`. The transaction is finished exactly
    /// once, also when `target` panics.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %self.name))]
    pub fn invoke<T, E, F>(&self, target: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let Some(policy) = &self.policy else {
            debug!("Skipping transaction management");
            return target();
        };
        let attribute = policy.attribute;

        debug!(attribute = %attribute, "Beginning transaction");
        let token = attribute.begin(policy.manager.as_ref())?;
        let guard = FinishGuard {
            manager: policy.manager.as_ref(),
            token: Some(token),
        };

        if let Err(err) = guard.enlist(policy.resources.as_ref()) {
            guard.fail();
            return Err(err.into());
        }

        debug!(
            attribute = %attribute,
            completion_allowed = guard.completion_allowed(),
            "Calling method"
        );
        match target() {
            Ok(value) => {
                if policy.rollback_only {
                    if let Err(err) = guard.mark_rollback_only() {
                        guard.fail();
                        return Err(err.into());
                    }
                }
                debug!(attribute = %attribute, "Finishing transaction");
                guard.finish()?;
                Ok(value)
            }
            Err(err) => {
                debug!(
                    attribute = %attribute,
                    completion_allowed = guard.completion_allowed(),
                    "Rolling back"
                );
                guard.fail();
                Err(err)
            }
        }
    }
}

impl fmt::Debug for TransactionalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionalMethod")
            .field("name", &self.name)
            .field("attribute", &self.attribute())
            .field("rollback_only", &self.is_rollback_only())
            .finish()
    }
}

/// Finishes the token exactly once. Dropped while still holding it (the
/// target panicked), it rolls back first.
struct FinishGuard<'a> {
    manager: &'a dyn TransactionManager,
    token: Option<TransactionToken>,
}

impl FinishGuard<'_> {
    fn has_transaction(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| t.active_transaction().is_some())
    }

    fn completion_allowed(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(TransactionToken::is_completion_allowed)
    }

    fn enlist(&self, resources: &dyn ResourceProvider) -> Result<()> {
        let Some(transaction) = self.token.as_ref().and_then(TransactionToken::active_transaction)
        else {
            return Ok(());
        };
        let resource = resources.resource()?;
        trace!(
            resource = resource.name(),
            transaction = %transaction.global_id(),
            "Enlisting resource"
        );
        transaction.enlist_resource(resource)
    }

    fn mark_rollback_only(&self) -> Result<()> {
        if self.has_transaction() {
            self.manager.set_rollback_only()
        } else {
            Ok(())
        }
    }

    fn finish(mut self) -> Result<()> {
        match self.token.take() {
            Some(token) => token.finish(self.manager),
            None => Ok(()),
        }
    }

    /// Roll back and finish after the main path failed. Secondary failures
    /// are only logged.
    fn fail(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        let attribute = token.attribute();
        if token.active_transaction().is_some() {
            if let Err(err) = self.manager.set_rollback_only() {
                warn!(attribute = %attribute, error = %err, "Failed to mark transaction rollback-only");
            }
        }
        if let Err(err) = token.finish(self.manager) {
            warn!(attribute = %attribute, error = %err, "Failed to finish transaction");
        }
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if self.token.is_some() {
            warn!("Method panicked, rolling back");
            self.abort();
        }
    }
}
