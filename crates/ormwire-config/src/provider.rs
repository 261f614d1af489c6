//! The configuration build routine.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use ormwire_core::{
    Configuration, DataSource, DatabaseIdProvider, Environment, ErrorContext, Interceptor, Mapper,
    MapperDefinition, Result, Settings, TypeHandler, TypeKey,
};
use tracing::{debug, info};

use crate::bindings::Bindings;
use crate::error::ProvisionError;
use crate::setting::ConfigurationSetting;

/// Collects everything injected into a configuration and builds it.
///
/// Every call to [`build`](Self::build) produces a fresh [`Configuration`].
///
/// # Example
///
/// ```ignore
/// let configuration = ConfigurationProvider::new(environment, data_source)
///     .settings(Settings::new().lazy_loading_enabled(true))
///     .type_alias("hero", TypeKey::of::<Hero>())
///     .add_mapper::<HeroMapper>()
///     .fail_fast(true)
///     .build()?;
/// ```
pub struct ConfigurationProvider {
    environment: Environment,
    data_source: Arc<dyn DataSource>,
    settings: Settings,
    fail_fast: bool,
    type_aliases: BTreeMap<String, TypeKey>,
    type_handlers: HashMap<TypeKey, Arc<dyn TypeHandler>>,
    mapping_type_handlers: Vec<Arc<dyn TypeHandler>>,
    mappers: Vec<MapperDefinition>,
    plugins: Vec<Arc<dyn Interceptor>>,
    database_id_provider: Option<Arc<dyn DatabaseIdProvider>>,
    configuration_settings: Vec<Arc<dyn ConfigurationSetting>>,
}

impl ConfigurationProvider {
    pub fn new(environment: Environment, data_source: Arc<dyn DataSource>) -> Self {
        Self {
            environment,
            data_source,
            settings: Settings::default(),
            fail_fast: false,
            type_aliases: BTreeMap::new(),
            type_handlers: HashMap::new(),
            mapping_type_handlers: Vec::new(),
            mappers: Vec::new(),
            plugins: Vec::new(),
            database_id_provider: None,
            configuration_settings: Vec::new(),
        }
    }

    /// Provider whose scalar flags and fail-fast switch come from named bindings.
    pub fn from_bindings(
        environment: Environment,
        data_source: Arc<dyn DataSource>,
        bindings: &Bindings,
    ) -> Result<Self> {
        let (settings, fail_fast) = bindings.resolve()?;
        Ok(Self::new(environment, data_source)
            .settings(settings)
            .fail_fast(fail_fast))
    }

    /// Replace the scalar flags.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Resolve every mapped statement during the build.
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Bind `name` to `ty`. Binding the same name again replaces it.
    #[must_use]
    pub fn type_alias(mut self, name: impl Into<String>, ty: TypeKey) -> Self {
        self.type_aliases.insert(name.into(), ty);
        self
    }

    /// Handler for an explicit type. Binding the same type again replaces it.
    #[must_use]
    pub fn type_handler(mut self, ty: TypeKey, handler: Arc<dyn TypeHandler>) -> Self {
        self.type_handlers.insert(ty, handler);
        self
    }

    /// Handler registered under the type it describes itself.
    #[must_use]
    pub fn mapping_type_handler(mut self, handler: Arc<dyn TypeHandler>) -> Self {
        self.mapping_type_handlers.push(handler);
        self
    }

    /// Add a mapper. A mapper type already added is ignored.
    #[must_use]
    pub fn mapper(mut self, definition: MapperDefinition) -> Self {
        if self.mappers.iter().any(|m| m.key() == definition.key()) {
            debug!(mapper = definition.key().name(), "Mapper already added");
        } else {
            self.mappers.push(definition);
        }
        self
    }

    #[must_use]
    pub fn add_mapper<M: Mapper>(self) -> Self {
        self.mapper(M::definition())
    }

    /// Append a plugin. The same plugin instance is only added once.
    #[must_use]
    pub fn plugin(mut self, plugin: Arc<dyn Interceptor>) -> Self {
        if !self.plugins.iter().any(|p| Arc::ptr_eq(p, &plugin)) {
            self.plugins.push(plugin);
        }
        self
    }

    #[must_use]
    pub fn database_id_provider(mut self, provider: Arc<dyn DatabaseIdProvider>) -> Self {
        self.database_id_provider = Some(provider);
        self
    }

    /// Append a callback run after the scalar flags are applied.
    #[must_use]
    pub fn setting(mut self, setting: impl ConfigurationSetting + 'static) -> Self {
        self.configuration_settings.push(Arc::new(setting));
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Build a new configuration.
    ///
    /// Any failure after the flags and callbacks are applied is reported as a
    /// single [`ProvisionError`]. The thread's error context is reset on
    /// return, whether the build succeeded, failed or panicked.
    #[tracing::instrument(level = "debug", skip(self), fields(environment = self.environment.id()))]
    pub fn build(&self) -> std::result::Result<Configuration, ProvisionError> {
        let _scope = ErrorContext::scope();

        let mut configuration = Configuration::new(self.environment.clone());
        configuration.set_settings(self.settings.clone());
        for setting in &self.configuration_settings {
            setting.apply_configuration_setting(&mut configuration);
        }

        self.register(&mut configuration)
            .map_err(|e| ProvisionError::new(e, ErrorContext::snapshot()))?;

        info!(
            environment = self.environment.id(),
            database_id = ?configuration.database_id(),
            mappers = configuration.mapper_registry().mappers().len(),
            statements = configuration.mapped_statement_names().len(),
            plugins = configuration.interceptors().len(),
            "Configuration built"
        );
        Ok(configuration)
    }

    fn register(&self, configuration: &mut Configuration) -> Result<()> {
        let environment = self.environment.id();

        if let Some(provider) = &self.database_id_provider {
            ErrorContext::enter(environment, "resolving the database id");
            let database_id = provider.database_id(self.data_source.as_ref())?;
            debug!(database_id = ?database_id, "Resolved database id");
            configuration.set_database_id(database_id);
        }

        ErrorContext::enter(environment, "registering type aliases");
        for (name, ty) in &self.type_aliases {
            ErrorContext::object(name.clone());
            configuration
                .type_alias_registry_mut()
                .register_alias(name, *ty)?;
        }

        ErrorContext::enter(environment, "registering type handlers");
        for (ty, handler) in &self.type_handlers {
            configuration
                .type_handler_registry_mut()
                .register_for(*ty, Arc::clone(handler));
        }
        for handler in &self.mapping_type_handlers {
            ErrorContext::object(handler.name());
            configuration
                .type_handler_registry_mut()
                .register(Arc::clone(handler))?;
        }

        for mapper in &self.mappers {
            if configuration.has_mapper(mapper.key()) {
                debug!(mapper = mapper.key().name(), "Mapper already registered, skipping");
                continue;
            }
            configuration.add_mapper(mapper.clone())?;
        }

        for plugin in &self.plugins {
            configuration.add_interceptor(Arc::clone(plugin));
        }

        if self.fail_fast {
            ErrorContext::enter(environment, "building all statements");
            configuration.build_all_statements()?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConfigurationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationProvider")
            .field("environment", &self.environment.id())
            .field("settings", &self.settings)
            .field("fail_fast", &self.fail_fast)
            .field("type_aliases", &self.type_aliases)
            .field("type_handlers", &self.type_handlers.len())
            .field("mapping_type_handlers", &self.mapping_type_handlers.len())
            .field("mappers", &self.mappers.len())
            .field("plugins", &self.plugins)
            .field("database_id_provider", &self.database_id_provider.is_some())
            .field("configuration_settings", &self.configuration_settings.len())
            .finish()
    }
}
