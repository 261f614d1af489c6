//! Mapper definitions and the mapped statements built from them.
//!
//! A mapper is a Rust type describing a namespace of SQL statements. Since
//! there is no runtime reflection, mappers describe themselves through a
//! [`MapperDefinition`], either built inline or returned by [`Mapper`].
//!
//! ```
//! use ormwire_core::{MapperDefinition, StatementDefinition, TypeKey};
//!
//! struct Hero;
//! struct HeroMapper;
//!
//! let mapper = MapperDefinition::of::<HeroMapper>()
//!     .with_namespace("app.HeroMapper")
//!     .with_result_map("heroMap", TypeKey::of::<Hero>())
//!     .with_statement(
//!         StatementDefinition::select("findAll", "SELECT * FROM heroes").with_result_map("heroMap"),
//!     );
//! assert_eq!(mapper.namespace(), "app.HeroMapper");
//! assert_eq!(mapper.statements().len(), 1);
//! ```

use crate::types::TypeKey;

/// A type that describes its own mapper definition.
pub trait Mapper: 'static {
    fn definition() -> MapperDefinition;
}

/// Kind of SQL command a statement runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

/// One statement declared by a mapper, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDefinition {
    /// Id local to the mapper namespace
    pub id: String,
    pub kind: StatementKind,
    pub sql: String,
    /// Result map id, local or namespace-qualified
    pub result_map: Option<String>,
    pub result_type: Option<TypeKey>,
    /// Timeout in seconds; falls back to the configured default
    pub timeout: Option<u32>,
    /// Fetch size hint; falls back to the configured default
    pub fetch_size: Option<u32>,
}

impl StatementDefinition {
    pub fn new(kind: StatementKind, id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            sql: sql.into(),
            result_map: None,
            result_type: None,
            timeout: None,
            fetch_size: None,
        }
    }

    pub fn select(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(StatementKind::Select, id, sql)
    }

    pub fn insert(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(StatementKind::Insert, id, sql)
    }

    pub fn update(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(StatementKind::Update, id, sql)
    }

    pub fn delete(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(StatementKind::Delete, id, sql)
    }

    #[must_use]
    pub fn with_result_map(mut self, id: impl Into<String>) -> Self {
        self.result_map = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_result_type(mut self, ty: TypeKey) -> Self {
        self.result_type = Some(ty);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_fetch_size(mut self, rows: u32) -> Self {
        self.fetch_size = Some(rows);
        self
    }
}

/// A named result mapping declared by a mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMapDefinition {
    pub id: String,
    pub ty: TypeKey,
}

/// Everything a mapper type contributes to a configuration.
#[derive(Debug, Clone)]
pub struct MapperDefinition {
    pub(crate) key: TypeKey,
    pub(crate) namespace: String,
    pub(crate) result_maps: Vec<ResultMapDefinition>,
    pub(crate) statements: Vec<StatementDefinition>,
}

impl MapperDefinition {
    /// Definition for mapper type `M`, namespaced by its type path
    /// (`app::HeroMapper` becomes `app.HeroMapper`).
    pub fn of<M: ?Sized + 'static>() -> Self {
        let key = TypeKey::of::<M>();
        Self {
            key,
            namespace: key.name().replace("::", "."),
            result_maps: Vec::new(),
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_result_map(mut self, id: impl Into<String>, ty: TypeKey) -> Self {
        self.result_maps.push(ResultMapDefinition { id: id.into(), ty });
        self
    }

    #[must_use]
    pub fn with_statement(mut self, statement: StatementDefinition) -> Self {
        self.statements.push(statement);
        self
    }

    pub const fn key(&self) -> TypeKey {
        self.key
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn result_maps(&self) -> &[ResultMapDefinition] {
        &self.result_maps
    }

    pub fn statements(&self) -> &[StatementDefinition] {
        &self.statements
    }
}

/// A resolved result map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMap {
    /// Namespace-qualified id
    pub id: String,
    pub ty: TypeKey,
}

/// A fully resolved statement, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStatement {
    /// Namespace-qualified id
    pub id: String,
    pub namespace: String,
    pub kind: StatementKind,
    pub sql: String,
    /// Namespace-qualified result map id
    pub result_map: Option<String>,
    pub result_type: Option<TypeKey>,
    pub timeout: Option<u32>,
    pub fetch_size: Option<u32>,
}

/// Qualify a reference to another element with `namespace` unless it
/// already carries one.
pub(crate) fn qualify(namespace: &str, id: &str) -> String {
    if id.contains('.') {
        id.to_string()
    } else {
        format!("{namespace}.{id}")
    }
}

/// Qualify the id of an element declared in `namespace`.
///
/// The id may repeat its own namespace as a prefix; any other dot is
/// rejected.
pub(crate) fn declare(namespace: &str, id: &str) -> Option<String> {
    match id.strip_prefix(namespace).and_then(|rest| rest.strip_prefix('.')) {
        Some(local) if !local.contains('.') => Some(id.to_string()),
        _ if id.contains('.') => None,
        _ => Some(format!("{namespace}.{id}")),
    }
}
