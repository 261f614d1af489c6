//! Scalar configuration flags.

use serde::{Deserialize, Serialize};

use crate::types::{AutoMappingBehavior, ExecutorType, LocalCacheScope, NullSqlType};

/// The seventeen scalar flags of a [`Configuration`](crate::Configuration).
///
/// `Default` yields the documented defaults. When deserialized, missing keys
/// take their default, so a partial JSON object is a valid source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Load associations lazily (default: false)
    pub lazy_loading_enabled: bool,
    /// Loading any lazy property loads all of them (default: true)
    pub aggressive_lazy_loading: bool,
    /// Allow multiple result sets from one statement (default: true)
    pub multiple_result_sets_enabled: bool,
    /// Retrieve generated keys after inserts (default: false)
    pub use_generated_keys: bool,
    /// Address columns by label instead of name (default: true)
    pub use_column_label: bool,
    /// Global switch for mapper caches (default: true)
    pub cache_enabled: bool,
    /// Default executor (default: SIMPLE)
    pub default_executor_type: ExecutorType,
    /// Auto-mapping of columns to fields (default: PARTIAL)
    pub auto_mapping_behavior: AutoMappingBehavior,
    /// Call setters for null column values (default: false)
    pub call_setters_on_nulls: bool,
    /// Statement timeout in seconds (default: none)
    pub default_statement_timeout: Option<u32>,
    /// Map `snake_case` columns onto `camelCase` properties (default: false)
    pub map_underscore_to_camel_case: bool,
    /// Driver fetch size hint (default: none)
    pub default_fetch_size: Option<u32>,
    /// Lifetime of the local statement cache (default: SESSION)
    pub local_cache_scope: LocalCacheScope,
    /// SQL type for untyped null parameters (default: OTHER)
    pub jdbc_type_for_null: NullSqlType,
    /// Reject row bounds on nested statements (default: false)
    pub safe_row_bounds_enabled: bool,
    /// Return an empty instance instead of none for all-null rows (default: false)
    pub return_instance_for_empty_row: bool,
    /// Use declared parameter names (default: true)
    pub use_actual_param_name: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lazy_loading_enabled: false,
            aggressive_lazy_loading: true,
            multiple_result_sets_enabled: true,
            use_generated_keys: false,
            use_column_label: true,
            cache_enabled: true,
            default_executor_type: ExecutorType::Simple,
            auto_mapping_behavior: AutoMappingBehavior::Partial,
            call_setters_on_nulls: false,
            default_statement_timeout: None,
            map_underscore_to_camel_case: false,
            default_fetch_size: None,
            local_cache_scope: LocalCacheScope::Session,
            jdbc_type_for_null: NullSqlType::Other,
            safe_row_bounds_enabled: false,
            return_instance_for_empty_row: false,
            use_actual_param_name: true,
        }
    }
}

impl Settings {
    /// Create settings with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `lazy_loading_enabled` (builder pattern).
    #[must_use]
    pub fn lazy_loading_enabled(mut self, value: bool) -> Self {
        self.lazy_loading_enabled = value;
        self
    }

    /// Set `aggressive_lazy_loading` (builder pattern).
    #[must_use]
    pub fn aggressive_lazy_loading(mut self, value: bool) -> Self {
        self.aggressive_lazy_loading = value;
        self
    }

    /// Set `cache_enabled` (builder pattern).
    #[must_use]
    pub fn cache_enabled(mut self, value: bool) -> Self {
        self.cache_enabled = value;
        self
    }

    /// Set the default executor (builder pattern).
    #[must_use]
    pub fn default_executor_type(mut self, value: ExecutorType) -> Self {
        self.default_executor_type = value;
        self
    }

    /// Set the auto-mapping behavior (builder pattern).
    #[must_use]
    pub fn auto_mapping_behavior(mut self, value: AutoMappingBehavior) -> Self {
        self.auto_mapping_behavior = value;
        self
    }

    /// Set the statement timeout in seconds (builder pattern).
    #[must_use]
    pub fn default_statement_timeout(mut self, seconds: u32) -> Self {
        self.default_statement_timeout = Some(seconds);
        self
    }

    /// Set the fetch size hint (builder pattern).
    #[must_use]
    pub fn default_fetch_size(mut self, rows: u32) -> Self {
        self.default_fetch_size = Some(rows);
        self
    }

    /// Set `map_underscore_to_camel_case` (builder pattern).
    #[must_use]
    pub fn map_underscore_to_camel_case(mut self, value: bool) -> Self {
        self.map_underscore_to_camel_case = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let s = Settings::default();
        assert!(!s.lazy_loading_enabled);
        assert!(s.aggressive_lazy_loading);
        assert!(s.multiple_result_sets_enabled);
        assert!(!s.use_generated_keys);
        assert!(s.use_column_label);
        assert!(s.cache_enabled);
        assert_eq!(s.default_executor_type, ExecutorType::Simple);
        assert_eq!(s.auto_mapping_behavior, AutoMappingBehavior::Partial);
        assert!(!s.call_setters_on_nulls);
        assert_eq!(s.default_statement_timeout, None);
        assert!(!s.map_underscore_to_camel_case);
        assert_eq!(s.default_fetch_size, None);
        assert_eq!(s.local_cache_scope, LocalCacheScope::Session);
        assert_eq!(s.jdbc_type_for_null, NullSqlType::Other);
        assert!(!s.safe_row_bounds_enabled);
        assert!(!s.return_instance_for_empty_row);
        assert!(s.use_actual_param_name);
    }

    #[test]
    fn builder_methods() {
        let s = Settings::new()
            .lazy_loading_enabled(true)
            .aggressive_lazy_loading(false)
            .cache_enabled(false)
            .default_executor_type(ExecutorType::Batch)
            .auto_mapping_behavior(AutoMappingBehavior::None)
            .default_statement_timeout(30)
            .default_fetch_size(500)
            .map_underscore_to_camel_case(true);

        assert!(s.lazy_loading_enabled);
        assert!(!s.aggressive_lazy_loading);
        assert!(!s.cache_enabled);
        assert_eq!(s.default_executor_type, ExecutorType::Batch);
        assert_eq!(s.auto_mapping_behavior, AutoMappingBehavior::None);
        assert_eq!(s.default_statement_timeout, Some(30));
        assert_eq!(s.default_fetch_size, Some(500));
        assert!(s.map_underscore_to_camel_case);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: Settings = serde_json::from_str(
            r#"{"lazyLoadingEnabled": true, "defaultExecutorType": "REUSE", "defaultStatementTimeout": 25}"#,
        )
        .unwrap();

        assert!(s.lazy_loading_enabled);
        assert_eq!(s.default_executor_type, ExecutorType::Reuse);
        assert_eq!(s.default_statement_timeout, Some(25));
        assert!(s.aggressive_lazy_loading);
        assert!(s.use_actual_param_name);
    }
}
