//! Type identity and the enumerated configuration values.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runtime identity of a Rust type.
///
/// Registries key aliases, type handlers and mappers by `TypeKey`. Equality
/// and hashing use the `TypeId` only; the name is kept for messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name (`crate::model::Hero` -> `Hero`).
    #[must_use]
    pub fn simple_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn unknown_variant(what: &str, value: &str, expected: &[&str]) -> Error {
    Error::config(format!(
        "invalid {what} '{value}', expected one of {}",
        expected.join(", ")
    ))
}

/// How statements are executed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutorType {
    /// Prepare a new statement per execution
    #[default]
    Simple,
    /// Reuse prepared statements
    Reuse,
    /// Batch updates
    Batch,
}

impl ExecutorType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutorType::Simple => "SIMPLE",
            ExecutorType::Reuse => "REUSE",
            ExecutorType::Batch => "BATCH",
        }
    }
}

impl FromStr for ExecutorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIMPLE" => Ok(ExecutorType::Simple),
            "REUSE" => Ok(ExecutorType::Reuse),
            "BATCH" => Ok(ExecutorType::Batch),
            _ => Err(unknown_variant(
                "executor type",
                s,
                &["SIMPLE", "REUSE", "BATCH"],
            )),
        }
    }
}

impl fmt::Display for ExecutorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How columns are automatically mapped to fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoMappingBehavior {
    /// No auto-mapping
    None,
    /// Auto-map results without nested result mappings
    #[default]
    Partial,
    /// Auto-map everything, nested results included
    Full,
}

impl AutoMappingBehavior {
    pub const fn as_str(self) -> &'static str {
        match self {
            AutoMappingBehavior::None => "NONE",
            AutoMappingBehavior::Partial => "PARTIAL",
            AutoMappingBehavior::Full => "FULL",
        }
    }
}

impl FromStr for AutoMappingBehavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(AutoMappingBehavior::None),
            "PARTIAL" => Ok(AutoMappingBehavior::Partial),
            "FULL" => Ok(AutoMappingBehavior::Full),
            _ => Err(unknown_variant(
                "auto-mapping behavior",
                s,
                &["NONE", "PARTIAL", "FULL"],
            )),
        }
    }
}

impl fmt::Display for AutoMappingBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope of the session-local statement cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalCacheScope {
    /// Cache lives for the whole session
    #[default]
    Session,
    /// Cache is cleared after every statement
    Statement,
}

impl LocalCacheScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            LocalCacheScope::Session => "SESSION",
            LocalCacheScope::Statement => "STATEMENT",
        }
    }
}

impl FromStr for LocalCacheScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SESSION" => Ok(LocalCacheScope::Session),
            "STATEMENT" => Ok(LocalCacheScope::Statement),
            _ => Err(unknown_variant(
                "local cache scope",
                s,
                &["SESSION", "STATEMENT"],
            )),
        }
    }
}

impl fmt::Display for LocalCacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL type used when binding a null parameter without an explicit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullSqlType {
    Null,
    Varchar,
    #[default]
    Other,
}

impl NullSqlType {
    pub const fn as_str(self) -> &'static str {
        match self {
            NullSqlType::Null => "NULL",
            NullSqlType::Varchar => "VARCHAR",
            NullSqlType::Other => "OTHER",
        }
    }
}

impl FromStr for NullSqlType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NULL" => Ok(NullSqlType::Null),
            "VARCHAR" => Ok(NullSqlType::Varchar),
            "OTHER" => Ok(NullSqlType::Other),
            _ => Err(unknown_variant(
                "null sql type",
                s,
                &["NULL", "VARCHAR", "OTHER"],
            )),
        }
    }
}

impl fmt::Display for NullSqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Hero;
    struct Team;

    #[test]
    fn type_key_identity() {
        assert_eq!(TypeKey::of::<Hero>(), TypeKey::of::<Hero>());
        assert_ne!(TypeKey::of::<Hero>(), TypeKey::of::<Team>());

        let set: HashSet<TypeKey> = [TypeKey::of::<Hero>(), TypeKey::of::<Hero>()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn type_key_names() {
        let key = TypeKey::of::<Hero>();
        assert!(key.name().ends_with("::Hero"));
        assert_eq!(key.simple_name(), "Hero");
        assert_eq!(TypeKey::of::<Vec<Hero>>().simple_name(), "Vec");
        assert_eq!(TypeKey::of::<str>().simple_name(), "str");
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("reuse".parse::<ExecutorType>().unwrap(), ExecutorType::Reuse);
        assert_eq!(" BATCH ".parse::<ExecutorType>().unwrap(), ExecutorType::Batch);
        assert_eq!(
            "Full".parse::<AutoMappingBehavior>().unwrap(),
            AutoMappingBehavior::Full
        );
        assert_eq!(
            "statement".parse::<LocalCacheScope>().unwrap(),
            LocalCacheScope::Statement
        );
        assert_eq!("null".parse::<NullSqlType>().unwrap(), NullSqlType::Null);
    }

    #[test]
    fn enum_parse_error_lists_choices() {
        let err = "PARALLEL".parse::<ExecutorType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid executor type 'PARALLEL', expected one of SIMPLE, REUSE, BATCH"
        );
    }

    #[test]
    fn enum_defaults_and_display() {
        assert_eq!(ExecutorType::default().to_string(), "SIMPLE");
        assert_eq!(AutoMappingBehavior::default().to_string(), "PARTIAL");
        assert_eq!(LocalCacheScope::default().to_string(), "SESSION");
        assert_eq!(NullSqlType::default().to_string(), "OTHER");
    }

    #[test]
    fn enums_serialize_upper_case() {
        let json = serde_json::to_string(&ExecutorType::Reuse).unwrap();
        assert_eq!(json, "\"REUSE\"");
        let parsed: AutoMappingBehavior = serde_json::from_str("\"NONE\"").unwrap();
        assert_eq!(parsed, AutoMappingBehavior::None);
    }
}
