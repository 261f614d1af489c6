//! Ormwire: wiring for a mapper-based ORM.
//!
//! Two independent pieces:
//!
//! - A configuration builder that turns injected settings, type aliases,
//!   type handlers, mappers and plugins into a ready [`Configuration`]
//! - A transactional interceptor that runs registered methods inside the
//!   transaction their [`Propagation`] asks for
//!
//! # Quick Start
//!
//! ```ignore
//! use ormwire::prelude::*;
//!
//! struct Hero;
//! struct HeroMapper;
//!
//! impl Mapper for HeroMapper {
//!     fn definition() -> MapperDefinition {
//!         MapperDefinition::of::<HeroMapper>()
//!             .with_namespace("app.HeroMapper")
//!             .with_result_map("heroMap", TypeKey::of::<Hero>())
//!             .with_statement(
//!                 StatementDefinition::select("findAll", "SELECT * FROM heroes")
//!                     .with_result_map("heroMap"),
//!             )
//!     }
//! }
//!
//! let configuration = ConfigurationProvider::new(environment, data_source)
//!     .settings(Settings::new().lazy_loading_enabled(true))
//!     .type_alias("hero", TypeKey::of::<Hero>())
//!     .add_mapper::<HeroMapper>()
//!     .fail_fast(true)
//!     .build()?;
//!
//! let interceptor = TransactionalInterceptor::new(manager, resources);
//! let find_all = interceptor.bind(
//!     &MethodDescriptor::of::<HeroService>("find_all").transactional(Transactional::default()),
//! );
//! let heroes = find_all.invoke(|| service.find_all())?;
//! ```

pub use ormwire_core::{
    AutoMappingBehavior, Configuration, DataSource, DatabaseIdProvider, Environment, Error,
    ErrorContext, ExecutorType, Interceptor, InterceptorChain, LocalCacheScope, MappedStatement,
    Mapper, MapperDefinition, MapperRegistry, NullSqlType, RegistryErrorKind, Result, Settings,
    StatementDefinition, StatementErrorKind, StatementKind, TransactionErrorKind,
    TransactionFactory, TypeAliasRegistry, TypeHandler, TypeHandlerRegistry, TypeKey,
    VendorDatabaseIdProvider,
};

pub use ormwire_config::{Bindings, ConfigurationProvider, ConfigurationSetting, ProvisionError};

pub use ormwire_tx::{
    MethodDescriptor, Propagation, ResourceProvider, Transaction, TransactionAttribute,
    TransactionManager, TransactionStatus, TransactionToken, Transactional,
    TransactionalInterceptor, TransactionalMethod, TransactionalResource,
};

/// Named binding keys.
pub use ormwire_config::bindings;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        // Configuration
        Bindings,
        Configuration,
        ConfigurationProvider,
        ConfigurationSetting,
        DataSource,
        DatabaseIdProvider,
        Environment,
        Error,
        Interceptor,
        MappedStatement,
        Mapper,
        MapperDefinition,
        // Transactions
        MethodDescriptor,
        Propagation,
        ProvisionError,
        ResourceProvider,
        Result,
        Settings,
        StatementDefinition,
        Transaction,
        TransactionFactory,
        TransactionManager,
        TransactionStatus,
        Transactional,
        TransactionalInterceptor,
        TransactionalResource,
        TypeHandler,
        TypeKey,
    };
}
