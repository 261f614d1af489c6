//! Error types for Ormwire operations.

use std::fmt;

/// The primary error type for configuration and transaction plumbing.
#[derive(Debug)]
pub enum Error {
    /// Alias, type handler or mapper registration errors
    Registry(RegistryError),
    /// Mapped statement resolution errors
    Statement(StatementError),
    /// Transaction manager errors
    Transaction(TransactionError),
    /// Data source errors (metadata lookup, database id resolution)
    DataSource(DataSourceError),
    /// Configuration errors (bindings, settings)
    Config(ConfigError),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct RegistryError {
    pub kind: RegistryErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorKind {
    /// Alias name is empty
    InvalidAlias,
    /// Alias already mapped to a different type
    AliasConflict,
    /// Alias lookup failed
    UnknownAlias,
    /// A self-describing type handler did not describe its type
    UnresolvedHandlerType,
    /// Mapper type registered twice
    DuplicateMapper,
    /// Result map id registered twice
    DuplicateResultMap,
}

#[derive(Debug)]
pub struct StatementError {
    pub kind: StatementErrorKind,
    /// Fully qualified statement ids involved in the failure
    pub statements: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementErrorKind {
    /// Statement references a result map that is not registered
    Incomplete,
    /// No statement with that id
    NotFound,
    /// Statement id registered twice
    Duplicate,
    /// Element id or namespace is malformed
    InvalidId,
}

#[derive(Debug)]
pub struct TransactionError {
    pub kind: TransactionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionErrorKind {
    /// Operation not allowed in the current transaction state
    IllegalState,
    /// Nested transactions are not supported by the manager
    NestedNotSupported,
    /// Transaction was rolled back instead of committed
    RolledBack,
    /// Heuristic outcome reported by a resource
    Heuristic,
    /// Resource could not be enlisted
    Enlist,
    /// Unexpected manager failure
    System,
}

#[derive(Debug)]
pub struct DataSourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Registry error shorthand.
    pub fn registry(kind: RegistryErrorKind, message: impl Into<String>) -> Self {
        Error::Registry(RegistryError {
            kind,
            message: message.into(),
        })
    }

    /// Transaction error shorthand.
    pub fn transaction(kind: TransactionErrorKind, message: impl Into<String>) -> Self {
        Error::Transaction(TransactionError {
            kind,
            message: message.into(),
            source: None,
        })
    }

    /// Configuration error shorthand.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
            source: None,
        })
    }

    /// Is this a statement that could not be resolved yet?
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::Statement(s) if s.kind == StatementErrorKind::Incomplete)
    }

    /// Transaction error kind, if this is a transaction error.
    pub fn transaction_kind(&self) -> Option<TransactionErrorKind> {
        match self {
            Error::Transaction(t) => Some(t.kind),
            _ => None,
        }
    }

    /// Registry error kind, if this is a registry error.
    pub fn registry_kind(&self) -> Option<RegistryErrorKind> {
        match self {
            Error::Registry(r) => Some(r.kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Registry(e) => write!(f, "Registry error: {}", e.message),
            Error::Statement(e) => write!(f, "Statement error: {}", e),
            Error::Transaction(e) => write!(f, "Transaction error: {}", e.message),
            Error::DataSource(e) => write!(f, "Data source error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transaction(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::DataSource(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} [{}]", self.message, self.statements.join(", "))
        }
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Error::Registry(err)
    }
}

impl From<StatementError> for Error {
    fn from(err: StatementError) -> Self {
        Error::Statement(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Transaction(err)
    }
}

impl From<DataSourceError> for Error {
    fn from(err: DataSourceError) -> Self {
        Error::DataSource(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// Result type alias for Ormwire operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kind_helpers() {
        let err = Error::registry(RegistryErrorKind::AliasConflict, "taken");
        assert_eq!(err.registry_kind(), Some(RegistryErrorKind::AliasConflict));
        assert_eq!(err.transaction_kind(), None);
        assert!(!err.is_incomplete());

        let err = Error::Statement(StatementError {
            kind: StatementErrorKind::Incomplete,
            statements: vec!["a.b".to_string()],
            message: "unresolved".to_string(),
        });
        assert!(err.is_incomplete());
        assert_eq!(err.to_string(), "Statement error: unresolved [a.b]");
    }

    #[test]
    fn source_is_exposed() {
        let err = Error::DataSource(DataSourceError {
            message: "metadata unavailable".to_string(),
            source: Some(Box::new(std::io::Error::other("socket closed"))),
        });
        assert_eq!(err.to_string(), "Data source error: metadata unavailable");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("socket closed"));

        let err = Error::transaction(TransactionErrorKind::IllegalState, "no transaction");
        assert!(err.source().is_none());
        assert_eq!(err.transaction_kind(), Some(TransactionErrorKind::IllegalState));
    }
}
