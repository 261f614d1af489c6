//! Named constant bindings.
//!
//! Containers that inject configuration by name bind string values to
//! well-known keys; [`Bindings::resolve`] turns them into [`Settings`] and
//! the fail-fast flag. Every key is optional: unbound flags keep their
//! default.

use std::collections::BTreeMap;
use std::str::FromStr;

use ormwire_core::{ConfigError, Error, Result, Settings};
use serde_json::Value;

pub const PREFIX: &str = "ormwire.configuration.";

pub const LAZY_LOADING_ENABLED: &str = "ormwire.configuration.lazyLoadingEnabled";
pub const AGGRESSIVE_LAZY_LOADING: &str = "ormwire.configuration.aggressiveLazyLoading";
pub const MULTIPLE_RESULT_SETS_ENABLED: &str = "ormwire.configuration.multipleResultSetsEnabled";
pub const USE_GENERATED_KEYS: &str = "ormwire.configuration.useGeneratedKeys";
pub const USE_COLUMN_LABEL: &str = "ormwire.configuration.useColumnLabel";
pub const CACHE_ENABLED: &str = "ormwire.configuration.cacheEnabled";
pub const DEFAULT_EXECUTOR_TYPE: &str = "ormwire.configuration.defaultExecutorType";
pub const AUTO_MAPPING_BEHAVIOR: &str = "ormwire.configuration.autoMappingBehavior";
pub const CALL_SETTERS_ON_NULLS: &str = "ormwire.configuration.callSettersOnNulls";
pub const DEFAULT_STATEMENT_TIMEOUT: &str = "ormwire.configuration.defaultStatementTimeout";
pub const MAP_UNDERSCORE_TO_CAMEL_CASE: &str = "ormwire.configuration.mapUnderscoreToCamelCase";
pub const DEFAULT_FETCH_SIZE: &str = "ormwire.configuration.defaultFetchSize";
pub const LOCAL_CACHE_SCOPE: &str = "ormwire.configuration.localCacheScope";
pub const JDBC_TYPE_FOR_NULL: &str = "ormwire.configuration.jdbcTypeForNull";
pub const SAFE_ROW_BOUNDS_ENABLED: &str = "ormwire.configuration.safeRowBoundsEnabled";
pub const RETURN_INSTANCE_FOR_EMPTY_ROW: &str = "ormwire.configuration.returnInstanceForEmptyRow";
pub const USE_ACTUAL_PARAM_NAME: &str = "ormwire.configuration.useActualParamName";
pub const FAIL_FAST: &str = "ormwire.configuration.failFast";

/// String values bound to configuration names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, replacing any earlier binding.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings from a flat JSON object of `name: value` pairs.
    ///
    /// Strings, booleans and numbers are accepted; `null` leaves the name
    /// unbound.
    pub fn from_json(json: &Value) -> Result<Self> {
        let Value::Object(entries) = json else {
            return Err(Error::config("Bindings must be a JSON object"));
        };
        let mut bindings = Self::new();
        for (name, value) in entries {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::config(format!(
                        "Binding '{name}' must be a string, boolean or number"
                    )));
                }
            };
            bindings.insert(name.clone(), value);
        }
        Ok(bindings)
    }

    /// Parse the bound values into settings and the fail-fast flag.
    pub fn resolve(&self) -> Result<(Settings, bool)> {
        let mut settings = Settings::default();
        let mut fail_fast = false;

        for (name, value) in &self.values {
            match name.as_str() {
                LAZY_LOADING_ENABLED => settings.lazy_loading_enabled = flag(name, value)?,
                AGGRESSIVE_LAZY_LOADING => settings.aggressive_lazy_loading = flag(name, value)?,
                MULTIPLE_RESULT_SETS_ENABLED => {
                    settings.multiple_result_sets_enabled = flag(name, value)?;
                }
                USE_GENERATED_KEYS => settings.use_generated_keys = flag(name, value)?,
                USE_COLUMN_LABEL => settings.use_column_label = flag(name, value)?,
                CACHE_ENABLED => settings.cache_enabled = flag(name, value)?,
                DEFAULT_EXECUTOR_TYPE => settings.default_executor_type = parse(name, value)?,
                AUTO_MAPPING_BEHAVIOR => settings.auto_mapping_behavior = parse(name, value)?,
                CALL_SETTERS_ON_NULLS => settings.call_setters_on_nulls = flag(name, value)?,
                DEFAULT_STATEMENT_TIMEOUT => {
                    settings.default_statement_timeout = Some(parse(name, value)?);
                }
                MAP_UNDERSCORE_TO_CAMEL_CASE => {
                    settings.map_underscore_to_camel_case = flag(name, value)?;
                }
                DEFAULT_FETCH_SIZE => settings.default_fetch_size = Some(parse(name, value)?),
                LOCAL_CACHE_SCOPE => settings.local_cache_scope = parse(name, value)?,
                JDBC_TYPE_FOR_NULL => settings.jdbc_type_for_null = parse(name, value)?,
                SAFE_ROW_BOUNDS_ENABLED => settings.safe_row_bounds_enabled = flag(name, value)?,
                RETURN_INSTANCE_FOR_EMPTY_ROW => {
                    settings.return_instance_for_empty_row = flag(name, value)?;
                }
                USE_ACTUAL_PARAM_NAME => settings.use_actual_param_name = flag(name, value)?,
                FAIL_FAST => fail_fast = flag(name, value)?,
                other if other.starts_with(PREFIX) => {
                    tracing::warn!(binding = other, "Ignoring unknown configuration binding");
                }
                _ => {}
            }
        }

        Ok((settings, fail_fast))
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse::<T>().map_err(|e| invalid(name, value, e))
}

/// Booleans parse case-insensitively, like the enum flags.
fn flag(name: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse::<bool>()
        .map_err(|e| invalid(name, value, e))
}

fn invalid(name: &str, value: &str, source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Config(ConfigError {
        message: format!("Invalid value '{value}' for binding '{name}'"),
        source: Some(Box::new(source)),
    })
}
