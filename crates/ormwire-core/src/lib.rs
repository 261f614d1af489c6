//! Core types for Ormwire.
//!
//! This crate holds the configuration object and everything it is made of:
//!
//! - `Configuration` with its `Settings` and `Environment`
//! - Type alias, type handler and mapper registries
//! - `Interceptor` plugins applied to statement SQL
//! - `Error` and the per-thread `ErrorContext` used to describe failures

pub mod configuration;
pub mod environment;
pub mod error;
pub mod error_context;
pub mod mapper_registry;
pub mod mapping;
pub mod plugin;
pub mod settings;
pub mod type_alias;
pub mod type_handler;
pub mod types;

pub use configuration::Configuration;
pub use environment::{
    DataSource, DatabaseIdProvider, Environment, TransactionFactory, VendorDatabaseIdProvider,
};
pub use error::{
    ConfigError, DataSourceError, Error, RegistryError, RegistryErrorKind, Result, StatementError,
    StatementErrorKind, TransactionError, TransactionErrorKind,
};
pub use error_context::{ErrorContext, ErrorContextScope};
pub use mapper_registry::MapperRegistry;
pub use mapping::{
    MappedStatement, Mapper, MapperDefinition, ResultMap, ResultMapDefinition,
    StatementDefinition, StatementKind,
};
pub use plugin::{Interceptor, InterceptorChain};
pub use settings::Settings;
pub use type_alias::TypeAliasRegistry;
pub use type_handler::{TypeHandler, TypeHandlerRegistry};
pub use types::{AutoMappingBehavior, ExecutorType, LocalCacheScope, NullSqlType, TypeKey};
