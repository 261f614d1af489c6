//! Type alias registry.

use std::collections::HashMap;

use crate::error::{Error, RegistryErrorKind, Result};
use crate::types::TypeKey;

/// Short names for types, resolved case-insensitively.
///
/// Names are stored lower-cased. Registering a name again for the same type
/// is a no-op; for a different type it is an error.
#[derive(Debug, Clone, Default)]
pub struct TypeAliasRegistry {
    aliases: HashMap<String, TypeKey>,
}

impl TypeAliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `ty`.
    pub fn register_alias(&mut self, name: &str, ty: TypeKey) -> Result<()> {
        if name.is_empty() {
            return Err(Error::registry(
                RegistryErrorKind::InvalidAlias,
                "The alias name cannot be empty",
            ));
        }
        let key = name.to_lowercase();
        if let Some(existing) = self.aliases.get(&key) {
            if *existing != ty {
                return Err(Error::registry(
                    RegistryErrorKind::AliasConflict,
                    format!(
                        "The alias '{name}' is already mapped to the value '{}'",
                        existing.name()
                    ),
                ));
            }
            return Ok(());
        }
        tracing::trace!(alias = %key, ty = ty.name(), "Registered type alias");
        self.aliases.insert(key, ty);
        Ok(())
    }

    /// Register `T` under its simple type name.
    pub fn register<T: ?Sized + 'static>(&mut self) -> Result<()> {
        let ty = TypeKey::of::<T>();
        self.register_alias(ty.simple_name(), ty)
    }

    /// Look up an alias.
    pub fn resolve_alias(&self, name: &str) -> Result<TypeKey> {
        self.aliases
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| {
                Error::registry(
                    RegistryErrorKind::UnknownAlias,
                    format!("Could not resolve type alias '{name}'"),
                )
            })
    }

    /// All aliases, keyed by lower-cased name.
    pub fn type_aliases(&self) -> &HashMap<String, TypeKey> {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
