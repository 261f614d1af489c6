//! Mapper registry: known mappers, result maps and statements.
//!
//! A statement may reference a result map registered later by another
//! mapper. Such statements are kept pending and retried after every
//! registration; only [`MapperRegistry::build_all_statements`] turns leftovers
//! into an error.

use std::collections::HashMap;

use crate::error::{Error, RegistryErrorKind, Result, StatementError, StatementErrorKind};
use crate::error_context::ErrorContext;
use crate::mapping::{
    MappedStatement, MapperDefinition, ResultMap, StatementDefinition, declare, qualify,
};
use crate::settings::Settings;
use crate::types::TypeKey;

#[derive(Debug, Clone)]
struct PendingStatement {
    namespace: String,
    /// Namespace-qualified id
    id: String,
    /// Definition with configured defaults already applied
    definition: StatementDefinition,
}

impl PendingStatement {
    fn result_map_id(&self) -> Option<String> {
        self.definition
            .result_map
            .as_deref()
            .map(|reference| qualify(&self.namespace, reference))
    }
}

/// Registry of mapper types and everything they declared.
#[derive(Debug, Clone, Default)]
pub struct MapperRegistry {
    known: Vec<TypeKey>,
    namespaces: HashMap<TypeKey, String>,
    result_maps: HashMap<String, ResultMap>,
    statements: HashMap<String, MappedStatement>,
    pending: Vec<PendingStatement>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_mapper(&self, ty: TypeKey) -> bool {
        self.namespaces.contains_key(&ty)
    }

    /// Known mapper types, in registration order.
    pub fn mappers(&self) -> &[TypeKey] {
        &self.known
    }

    pub fn namespace_of(&self, ty: TypeKey) -> Option<&str> {
        self.namespaces.get(&ty).map(String::as_str)
    }

    /// Register a mapper.
    ///
    /// Statement timeouts and fetch sizes fall back to `settings`. A failed
    /// registration leaves the registry untouched.
    pub fn add_mapper(&mut self, definition: MapperDefinition, settings: &Settings) -> Result<()> {
        let MapperDefinition {
            key,
            namespace,
            result_maps,
            statements,
        } = definition;

        if self.has_mapper(key) {
            return Err(Error::registry(
                RegistryErrorKind::DuplicateMapper,
                format!("Type {} is already known to the mapper registry", key.name()),
            ));
        }

        ErrorContext::enter(namespace.clone(), "registering mapper");
        ErrorContext::object(key.name());
        if namespace.is_empty() {
            return Err(invalid_id(
                format!("Mapper {} has an empty namespace", key.name()),
                &namespace,
            ));
        }

        let mut new_result_maps: Vec<ResultMap> = Vec::with_capacity(result_maps.len());
        for definition in result_maps {
            ErrorContext::object(definition.id.clone());
            let id = declared_id(&namespace, &definition.id)?;
            if self.result_maps.contains_key(&id) || new_result_maps.iter().any(|r| r.id == id) {
                return Err(Error::registry(
                    RegistryErrorKind::DuplicateResultMap,
                    format!("Result maps collection already contains value for {id}"),
                ));
            }
            new_result_maps.push(ResultMap {
                id,
                ty: definition.ty,
            });
        }

        let mut new_statements: Vec<PendingStatement> = Vec::with_capacity(statements.len());
        for mut definition in statements {
            ErrorContext::object(definition.id.clone());
            let id = declared_id(&namespace, &definition.id)?;
            if self.statements.contains_key(&id)
                || self.pending.iter().any(|p| p.id == id)
                || new_statements.iter().any(|p| p.id == id)
            {
                return Err(Error::Statement(StatementError {
                    kind: StatementErrorKind::Duplicate,
                    message: format!("Mapped statements collection already contains value for {id}"),
                    statements: vec![id],
                }));
            }
            definition.timeout = definition.timeout.or(settings.default_statement_timeout);
            definition.fetch_size = definition.fetch_size.or(settings.default_fetch_size);
            new_statements.push(PendingStatement {
                namespace: namespace.clone(),
                id,
                definition,
            });
        }

        tracing::debug!(
            namespace = %namespace,
            result_maps = new_result_maps.len(),
            statements = new_statements.len(),
            "Registering mapper"
        );

        self.known.push(key);
        self.namespaces.insert(key, namespace);
        for result_map in new_result_maps {
            self.result_maps.insert(result_map.id.clone(), result_map);
        }
        self.pending.extend(new_statements);

        let resolved = self.resolve_pending();
        tracing::trace!(resolved, pending = self.pending.len(), "Retried pending statements");
        Ok(())
    }

    /// Resolve every pending statement, failing if any remains unresolved.
    pub fn build_all_statements(&mut self) -> Result<()> {
        self.resolve_pending();
        if self.pending.is_empty() {
            return Ok(());
        }

        let statements: Vec<String> = self.pending.iter().map(|p| p.id.clone()).collect();
        let detail = self
            .pending
            .iter()
            .map(|p| format!("{}: {}", p.id, pending_reason(p)))
            .collect::<Vec<_>>()
            .join("; ");
        ErrorContext::update(|ctx| {
            ctx.activity = Some("building all statements".to_string());
            ctx.message = Some(detail.clone());
        });
        Err(Error::Statement(StatementError {
            kind: StatementErrorKind::Incomplete,
            statements,
            message: format!("Unresolved mapper elements remain: {detail}"),
        }))
    }

    /// Ids of all resolved statements, sorted.
    pub fn mapped_statement_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.statements.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a resolved statement by its namespace-qualified id.
    pub fn mapped_statement(&self, id: &str) -> Result<&MappedStatement> {
        if let Some(statement) = self.statements.get(id) {
            return Ok(statement);
        }
        if let Some(pending) = self.pending.iter().find(|p| p.id == id) {
            return Err(Error::Statement(StatementError {
                kind: StatementErrorKind::Incomplete,
                statements: vec![id.to_string()],
                message: format!(
                    "Mapped statement '{id}' is incomplete: {}",
                    pending_reason(pending)
                ),
            }));
        }
        Err(Error::Statement(StatementError {
            kind: StatementErrorKind::NotFound,
            statements: vec![id.to_string()],
            message: format!("Mapped statements collection does not contain value for {id}"),
        }))
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    pub fn result_map(&self, id: &str) -> Option<&ResultMap> {
        self.result_maps.get(id)
    }

    /// Ids of statements still waiting on a result map, sorted.
    pub fn incomplete_statements(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.pending.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Build every pending statement whose result map is now known. Returns
    /// the number of statements resolved.
    fn resolve_pending(&mut self) -> usize {
        let before = self.pending.len();
        for pending in std::mem::take(&mut self.pending) {
            let result_map = pending.result_map_id();
            if result_map
                .as_ref()
                .is_some_and(|id| !self.result_maps.contains_key(id))
            {
                self.pending.push(pending);
                continue;
            }
            let PendingStatement {
                namespace,
                id,
                definition,
            } = pending;
            self.statements.insert(
                id.clone(),
                MappedStatement {
                    id,
                    namespace,
                    kind: definition.kind,
                    sql: definition.sql,
                    result_map,
                    result_type: definition.result_type,
                    timeout: definition.timeout,
                    fetch_size: definition.fetch_size,
                },
            );
        }
        before - self.pending.len()
    }
}

fn pending_reason(pending: &PendingStatement) -> String {
    match pending.result_map_id() {
        Some(id) => format!("result map '{id}' not found"),
        None => "unresolved reference".to_string(),
    }
}

fn declared_id(namespace: &str, id: &str) -> Result<String> {
    declare(namespace, id).ok_or_else(|| {
        invalid_id(
            format!("Dots are not allowed in element names, please remove it from {id}"),
            id,
        )
    })
}

fn invalid_id(message: String, id: &str) -> Error {
    Error::Statement(StatementError {
        kind: StatementErrorKind::InvalidId,
        statements: vec![id.to_string()],
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::StatementKind;

    struct Human;
    struct HumanMapper;
    struct ErrorMapper;
    struct AuditMapper;

    fn human_mapper() -> MapperDefinition {
        MapperDefinition::of::<HumanMapper>()
            .with_namespace("app.HumanMapper")
            .with_result_map("humanMap", TypeKey::of::<Human>())
            .with_statement(
                StatementDefinition::select("findAll", "SELECT * FROM human")
                    .with_result_map("humanMap"),
            )
    }

    fn error_mapper() -> MapperDefinition {
        MapperDefinition::of::<ErrorMapper>()
            .with_namespace("app.ErrorMapper")
            .with_statement(
                StatementDefinition::select("countHumans", "SELECT count(*) FROM human")
                    .with_result_map("app.HumanMapper.humanMap"),
            )
    }

    #[test]
    fn resolves_statements_with_defaults() {
        let mut registry = MapperRegistry::new();
        let settings = Settings::new().default_statement_timeout(15);
        registry.add_mapper(human_mapper(), &settings).unwrap();

        let stmt = registry.mapped_statement("app.HumanMapper.findAll").unwrap();
        assert_eq!(stmt.kind, StatementKind::Select);
        assert_eq!(stmt.result_map.as_deref(), Some("app.HumanMapper.humanMap"));
        assert_eq!(stmt.timeout, Some(15));
        assert_eq!(registry.mappers(), &[TypeKey::of::<HumanMapper>()]);
        assert_eq!(
            registry.namespace_of(TypeKey::of::<HumanMapper>()),
            Some("app.HumanMapper")
        );
        assert!(registry.result_map("app.HumanMapper.humanMap").is_some());
    }

    #[test]
    fn duplicate_mapper_is_an_error() {
        let mut registry = MapperRegistry::new();
        let settings = Settings::default();
        registry.add_mapper(human_mapper(), &settings).unwrap();

        let err = registry.add_mapper(human_mapper(), &settings).unwrap_err();
        assert_eq!(err.registry_kind(), Some(RegistryErrorKind::DuplicateMapper));
        assert_eq!(registry.mappers().len(), 1);
    }

    #[test]
    fn pending_statement_resolves_when_dependency_arrives() {
        let mut registry = MapperRegistry::new();
        let settings = Settings::default();
        registry.add_mapper(error_mapper(), &settings).unwrap();

        assert_eq!(registry.incomplete_statements(), vec!["app.ErrorMapper.countHumans"]);
        let err = registry
            .mapped_statement("app.ErrorMapper.countHumans")
            .unwrap_err();
        assert!(err.is_incomplete());

        registry.add_mapper(human_mapper(), &settings).unwrap();
        assert!(registry.incomplete_statements().is_empty());
        assert!(registry.has_statement("app.ErrorMapper.countHumans"));
        registry.build_all_statements().unwrap();
    }

    #[test]
    fn build_all_statements_reports_leftovers() {
        let mut registry = MapperRegistry::new();
        registry.add_mapper(error_mapper(), &Settings::default()).unwrap();

        let err = registry.build_all_statements().unwrap_err();
        let Error::Statement(statement_error) = &err else {
            panic!("expected statement error, got {err:?}");
        };
        assert_eq!(statement_error.kind, StatementErrorKind::Incomplete);
        assert_eq!(statement_error.statements, vec!["app.ErrorMapper.countHumans"]);
        assert!(
            statement_error
                .message
                .contains("result map 'app.HumanMapper.humanMap' not found")
        );
        ErrorContext::reset();
    }

    #[test]
    fn failed_registration_leaves_no_trace() {
        let mut registry = MapperRegistry::new();
        let mapper = MapperDefinition::of::<AuditMapper>()
            .with_namespace("app.AuditMapper")
            .with_statement(StatementDefinition::insert("log", "INSERT INTO audit VALUES (?)"))
            .with_statement(StatementDefinition::insert("log", "INSERT INTO audit VALUES (?, ?)"));

        let err = registry.add_mapper(mapper, &Settings::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Statement(StatementError {
                kind: StatementErrorKind::Duplicate,
                ..
            })
        ));
        assert!(!registry.has_mapper(TypeKey::of::<AuditMapper>()));
        assert!(registry.mapped_statement_names().is_empty());
        assert!(registry.incomplete_statements().is_empty());
        ErrorContext::reset();
    }

    #[test]
    fn element_ids_follow_namespace_rule() {
        let mut registry = MapperRegistry::new();
        let mapper = MapperDefinition::of::<AuditMapper>()
            .with_namespace("app.AuditMapper")
            .with_statement(StatementDefinition::delete("purge-all", "DELETE FROM audit"))
            .with_statement(StatementDefinition::select(
                "app.AuditMapper.recent",
                "SELECT * FROM audit",
            ));
        registry.add_mapper(mapper, &Settings::default()).unwrap();
        assert_eq!(
            registry.mapped_statement_names(),
            vec!["app.AuditMapper.purge-all", "app.AuditMapper.recent"]
        );

        let mapper = MapperDefinition::of::<ErrorMapper>()
            .with_namespace("app.ErrorMapper")
            .with_statement(StatementDefinition::delete("purge.all", "DELETE FROM audit"));
        let err = registry.add_mapper(mapper, &Settings::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Statement(StatementError {
                kind: StatementErrorKind::InvalidId,
                ..
            })
        ));
        assert!(err.to_string().contains("Dots are not allowed in element names"));
        assert!(!registry.has_mapper(TypeKey::of::<ErrorMapper>()));
        ErrorContext::reset();
    }

    #[test]
    fn unknown_statement() {
        let registry = MapperRegistry::new();
        let err = registry.mapped_statement("app.Missing.find").unwrap_err();
        assert!(matches!(
            err,
            Error::Statement(StatementError {
                kind: StatementErrorKind::NotFound,
                ..
            })
        ));
    }
}
