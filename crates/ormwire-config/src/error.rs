//! Error returned when a configuration cannot be built.

use std::fmt;

use ormwire_core::{Error, ErrorContext};

/// Single error type of [`ConfigurationProvider::build`](crate::ConfigurationProvider::build).
///
/// Wraps the failure that interrupted the build, together with the error
/// context recorded on the building thread at the time.
#[derive(Debug)]
pub struct ProvisionError {
    source: Error,
    context: Option<ErrorContext>,
}

impl ProvisionError {
    pub const MESSAGE: &'static str = "An error occurred while building the configuration";

    pub fn new(source: Error, context: ErrorContext) -> Self {
        Self {
            source,
            context: (!context.is_empty()).then_some(context),
        }
    }

    /// The failure that interrupted the build.
    pub fn cause(&self) -> &Error {
        &self.source
    }

    pub fn into_cause(self) -> Error {
        self.source
    }

    /// Where the build was when it failed, if anything was recorded.
    pub fn context(&self) -> Option<&ErrorContext> {
        self.context.as_ref()
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", Self::MESSAGE, self.source)?;
        if let Some(context) = &self.context {
            write!(f, "\n{context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ProvisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
