//! Type handler registry.
//!
//! Handlers convert between a Rust type and its column representation. The
//! conversion itself is the engine's business; the registry only records
//! which handler serves which type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, RegistryErrorKind, Result};
use crate::types::TypeKey;

/// A column/value converter for one Rust type.
pub trait TypeHandler: Send + Sync + fmt::Debug {
    /// The type this handler maps, when it describes itself.
    ///
    /// Handlers registered without an explicit type must return `Some`.
    fn handled_type(&self) -> Option<TypeKey> {
        None
    }

    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Maps types to their handlers.
#[derive(Debug, Clone, Default)]
pub struct TypeHandlerRegistry {
    handlers: HashMap<TypeKey, Arc<dyn TypeHandler>>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `ty`, replacing any previous handler.
    pub fn register_for(&mut self, ty: TypeKey, handler: Arc<dyn TypeHandler>) {
        tracing::trace!(ty = ty.name(), handler = handler.name(), "Registered type handler");
        if let Some(previous) = self.handlers.insert(ty, handler) {
            tracing::debug!(
                ty = ty.name(),
                previous = previous.name(),
                "Replaced type handler"
            );
        }
    }

    /// Register a self-describing handler under its handled type.
    pub fn register(&mut self, handler: Arc<dyn TypeHandler>) -> Result<()> {
        let ty = handler.handled_type().ok_or_else(|| {
            Error::registry(
                RegistryErrorKind::UnresolvedHandlerType,
                format!(
                    "Type handler '{}' does not declare the type it handles",
                    handler.name()
                ),
            )
        })?;
        self.register_for(ty, handler);
        Ok(())
    }

    pub fn has_type_handler(&self, ty: TypeKey) -> bool {
        self.handlers.contains_key(&ty)
    }

    pub fn type_handler(&self, ty: TypeKey) -> Option<&Arc<dyn TypeHandler>> {
        self.handlers.get(&ty)
    }

    /// Every type with a registered handler.
    pub fn handled_types(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.handlers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
