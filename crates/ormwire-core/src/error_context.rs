//! Thread-local error-reporting context.
//!
//! Registration code records what it is doing (resource, activity, object)
//! so that a failure can be reported with where it happened. The context is
//! per thread and must be reset once a unit of work is over, successful or
//! not; [`ErrorContext::scope`] returns a guard that does that on drop.

use std::cell::RefCell;
use std::fmt;

thread_local! {
    static CONTEXT: RefCell<ErrorContext> = RefCell::new(ErrorContext::default());
}

/// Snapshot of the current thread's error context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Resource being processed (a mapper namespace, a data source)
    pub resource: Option<String>,
    /// What was being done
    pub activity: Option<String>,
    /// Object being processed
    pub object: Option<String>,
    /// Extra detail
    pub message: Option<String>,
    /// SQL involved, if any
    pub sql: Option<String>,
}

impl ErrorContext {
    /// Mutate the current thread's context.
    pub fn update(f: impl FnOnce(&mut ErrorContext)) {
        CONTEXT.with(|ctx| f(&mut ctx.borrow_mut()));
    }

    /// Set resource and activity, clearing the per-object fields.
    pub fn enter(resource: impl Into<String>, activity: impl Into<String>) {
        Self::update(|ctx| {
            ctx.resource = Some(resource.into());
            ctx.activity = Some(activity.into());
            ctx.object = None;
            ctx.message = None;
            ctx.sql = None;
        });
    }

    /// Record the object currently being processed.
    pub fn object(object: impl Into<String>) {
        Self::update(|ctx| ctx.object = Some(object.into()));
    }

    /// Copy of the current thread's context.
    pub fn snapshot() -> ErrorContext {
        CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    /// Clear the current thread's context.
    pub fn reset() {
        CONTEXT.with(|ctx| *ctx.borrow_mut() = ErrorContext::default());
    }

    /// Guard that resets the context when dropped.
    #[must_use = "the context is reset when the scope is dropped"]
    pub fn scope() -> ErrorContextScope {
        ErrorContextScope { _private: () }
    }

    pub fn is_empty(&self) -> bool {
        self.resource.is_none()
            && self.activity.is_none()
            && self.object.is_none()
            && self.message.is_none()
            && self.sql.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            ("The error may exist in", &self.resource),
            ("The error may involve", &self.object),
            ("The error occurred while", &self.activity),
            ("Cause", &self.message),
            ("SQL", &self.sql),
        ];
        let mut first = true;
        for (label, value) in lines {
            if let Some(value) = value {
                if !first {
                    writeln!(f)?;
                }
                write!(f, "### {label} {value}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Resets the thread-local [`ErrorContext`] when dropped, unwinding included.
#[derive(Debug)]
pub struct ErrorContextScope {
    _private: (),
}

impl Drop for ErrorContextScope {
    fn drop(&mut self) {
        ErrorContext::reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_clears_object_fields() {
        ErrorContext::enter("app.HeroMapper", "parsing statements");
        ErrorContext::object("countHeroes");
        ErrorContext::enter("app.TeamMapper", "parsing statements");

        let ctx = ErrorContext::snapshot();
        assert_eq!(ctx.resource.as_deref(), Some("app.TeamMapper"));
        assert!(ctx.object.is_none());
        ErrorContext::reset();
    }

    #[test]
    fn scope_resets_on_drop() {
        {
            let _scope = ErrorContext::scope();
            ErrorContext::enter("app.HeroMapper", "registering mapper");
            assert!(!ErrorContext::snapshot().is_empty());
        }
        assert!(ErrorContext::snapshot().is_empty());
    }

    #[test]
    fn scope_resets_on_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _scope = ErrorContext::scope();
            ErrorContext::enter("app.HeroMapper", "registering mapper");
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(ErrorContext::snapshot().is_empty());
    }

    #[test]
    fn display_skips_missing_fields() {
        let ctx = ErrorContext {
            resource: Some("app.HeroMapper".to_string()),
            activity: Some("resolving cache reference".to_string()),
            ..ErrorContext::default()
        };
        assert_eq!(
            ctx.to_string(),
            "### The error may exist in app.HeroMapper\n### The error occurred while resolving cache reference"
        );
        assert_eq!(ErrorContext::default().to_string(), "");
    }
}
