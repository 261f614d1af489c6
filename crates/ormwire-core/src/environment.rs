//! Environment, data source and database-id resolution.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A source of database connections.
///
/// Connection handling belongs to the driver; the configuration layer only
/// needs the metadata used to pick a database id.
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Database product name as reported by the driver (`PostgreSQL`, `MySQL`, ...).
    fn product_name(&self) -> Result<String>;
}

/// How sessions obtain their transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionFactory {
    /// Sessions commit and roll back the connection themselves
    #[default]
    Jdbc,
    /// An external transaction manager owns the transaction lifecycle
    Managed {
        /// Close the connection when the session closes
        close_connection: bool,
    },
}

impl TransactionFactory {
    /// Is the transaction lifecycle owned by an external manager?
    pub const fn is_managed(&self) -> bool {
        matches!(self, TransactionFactory::Managed { .. })
    }
}

/// Named pairing of a transaction factory with a data source.
#[derive(Debug, Clone)]
pub struct Environment {
    id: String,
    transaction_factory: TransactionFactory,
    data_source: Arc<dyn DataSource>,
}

impl Environment {
    pub fn new(
        id: impl Into<String>,
        transaction_factory: TransactionFactory,
        data_source: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            id: id.into(),
            transaction_factory,
            data_source,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn transaction_factory(&self) -> TransactionFactory {
        self.transaction_factory
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.transaction_factory == other.transaction_factory
            && Arc::ptr_eq(&self.data_source, &other.data_source)
    }
}

/// Resolves the database id used to select vendor-specific statements.
pub trait DatabaseIdProvider: Send + Sync {
    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>>;
}

impl<F> DatabaseIdProvider for F
where
    F: Fn(&dyn DataSource) -> Result<Option<String>> + Send + Sync,
{
    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>> {
        self(data_source)
    }
}

/// Database id from the product name.
///
/// Without properties the product name itself is the id. With properties,
/// the first `(fragment, id)` pair whose fragment occurs in the product name
/// wins; no match yields `None`.
#[derive(Debug, Clone, Default)]
pub struct VendorDatabaseIdProvider {
    properties: Vec<(String, String)>,
}

impl VendorDatabaseIdProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map product names containing `fragment` to `database_id`.
    #[must_use]
    pub fn property(mut self, fragment: impl Into<String>, database_id: impl Into<String>) -> Self {
        self.properties.push((fragment.into(), database_id.into()));
        self
    }
}

impl DatabaseIdProvider for VendorDatabaseIdProvider {
    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>> {
        let product = data_source.product_name()?;
        if self.properties.is_empty() {
            return Ok(Some(product));
        }
        let id = self
            .properties
            .iter()
            .find(|(fragment, _)| product.contains(fragment.as_str()))
            .map(|(_, id)| id.clone());
        tracing::trace!(product = %product, database_id = ?id, "Resolved database id");
        Ok(id)
    }
}
