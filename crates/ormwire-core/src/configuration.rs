//! The configuration object handed to sessions.

use std::sync::Arc;

use crate::environment::Environment;
use crate::error::Result;
use crate::mapper_registry::MapperRegistry;
use crate::mapping::{MappedStatement, Mapper, MapperDefinition};
use crate::plugin::{Interceptor, InterceptorChain};
use crate::settings::Settings;
use crate::type_alias::TypeAliasRegistry;
use crate::type_handler::TypeHandlerRegistry;
use crate::types::TypeKey;

/// Settings, registries and plugins for one environment.
///
/// Usually assembled by a configuration provider; every registry is also
/// reachable directly for callers wiring things by hand.
#[derive(Debug, Clone)]
pub struct Configuration {
    environment: Environment,
    settings: Settings,
    database_id: Option<String>,
    type_aliases: TypeAliasRegistry,
    type_handlers: TypeHandlerRegistry,
    mappers: MapperRegistry,
    interceptors: InterceptorChain,
}

impl Configuration {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            settings: Settings::default(),
            database_id: None,
            type_aliases: TypeAliasRegistry::new(),
            type_handlers: TypeHandlerRegistry::new(),
            mappers: MapperRegistry::new(),
            interceptors: InterceptorChain::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub fn set_database_id(&mut self, database_id: Option<String>) {
        self.database_id = database_id;
    }

    pub fn type_alias_registry(&self) -> &TypeAliasRegistry {
        &self.type_aliases
    }

    pub fn type_alias_registry_mut(&mut self) -> &mut TypeAliasRegistry {
        &mut self.type_aliases
    }

    pub fn type_handler_registry(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn type_handler_registry_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.type_handlers
    }

    pub fn mapper_registry(&self) -> &MapperRegistry {
        &self.mappers
    }

    pub fn has_mapper(&self, ty: TypeKey) -> bool {
        self.mappers.has_mapper(ty)
    }

    /// Register a mapper using the current settings.
    ///
    /// Settings should be final before mappers are added; statement defaults
    /// are captured at registration.
    pub fn add_mapper(&mut self, definition: MapperDefinition) -> Result<()> {
        self.mappers.add_mapper(definition, &self.settings)
    }

    /// Register mapper type `M` from its own definition.
    pub fn add_mapper_type<M: Mapper>(&mut self) -> Result<()> {
        self.add_mapper(M::definition())
    }

    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.add_interceptor(interceptor);
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        self.interceptors.interceptors()
    }

    pub fn interceptor_chain(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Resolve all pending statements, failing on any leftover.
    pub fn build_all_statements(&mut self) -> Result<()> {
        self.mappers.build_all_statements()
    }

    pub fn mapped_statement_names(&self) -> Vec<&str> {
        self.mappers.mapped_statement_names()
    }

    pub fn mapped_statement(&self, id: &str) -> Result<&MappedStatement> {
        self.mappers.mapped_statement(id)
    }

    /// SQL for statement `id` after all interceptors ran.
    pub fn bound_sql(&self, id: &str) -> Result<String> {
        let statement = self.mapped_statement(id)?;
        self.interceptors.apply(statement, statement.sql.clone())
    }
}
