//! Transactional method descriptors.

use std::fmt;
use std::str::FromStr;

use ormwire_core::{Error, Result, TypeKey};
use serde::{Deserialize, Serialize};

use crate::attribute::TransactionAttribute;

/// Container-managed propagation requested for a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Propagation {
    #[default]
    Required,
    RequiresNew,
    Mandatory,
    Supports,
    Never,
    NotSupported,
}

impl Propagation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Propagation::Required => "REQUIRED",
            Propagation::RequiresNew => "REQUIRES_NEW",
            Propagation::Mandatory => "MANDATORY",
            Propagation::Supports => "SUPPORTS",
            Propagation::Never => "NEVER",
            Propagation::NotSupported => "NOT_SUPPORTED",
        }
    }

    /// The policy implementing this propagation.
    ///
    /// `NotSupported` has none: such methods run without any transaction
    /// management, and a caller's transaction is not suspended.
    pub const fn attribute(self) -> Option<TransactionAttribute> {
        match self {
            Propagation::Required => Some(TransactionAttribute::Required),
            Propagation::RequiresNew => Some(TransactionAttribute::RequiresNew),
            Propagation::Mandatory => Some(TransactionAttribute::Mandatory),
            Propagation::Supports => Some(TransactionAttribute::Supports),
            Propagation::Never => Some(TransactionAttribute::Never),
            Propagation::NotSupported => None,
        }
    }
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Propagation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "REQUIRED" => Ok(Propagation::Required),
            "REQUIRES_NEW" => Ok(Propagation::RequiresNew),
            "MANDATORY" => Ok(Propagation::Mandatory),
            "SUPPORTS" => Ok(Propagation::Supports),
            "NEVER" => Ok(Propagation::Never),
            "NOT_SUPPORTED" => Ok(Propagation::NotSupported),
            _ => Err(Error::config(format!(
                "invalid propagation '{s}', expected one of REQUIRED, REQUIRES_NEW, MANDATORY, SUPPORTS, NEVER, NOT_SUPPORTED"
            ))),
        }
    }
}

/// Transaction demarcation requested for a method or a whole type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transactional {
    pub propagation: Propagation,
    /// Roll back even when the method succeeds
    pub rollback_only: bool,
}

impl Transactional {
    pub fn new(propagation: Propagation) -> Self {
        Self {
            propagation,
            rollback_only: false,
        }
    }

    #[must_use]
    pub fn rollback_only(mut self, rollback_only: bool) -> Self {
        self.rollback_only = rollback_only;
        self
    }
}

/// A method registered for interception.
///
/// Stands in for annotations: the method-level descriptor wins over the one
/// declared for the whole type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    declaring_type: TypeKey,
    method: String,
    method_transactional: Option<Transactional>,
    type_transactional: Option<Transactional>,
}

impl MethodDescriptor {
    /// Method `method` declared by `T`.
    pub fn of<T: ?Sized + 'static>(method: impl Into<String>) -> Self {
        Self {
            declaring_type: TypeKey::of::<T>(),
            method: method.into(),
            method_transactional: None,
            type_transactional: None,
        }
    }

    /// Descriptor on the method itself.
    #[must_use]
    pub fn transactional(mut self, transactional: Transactional) -> Self {
        self.method_transactional = Some(transactional);
        self
    }

    /// Descriptor on the declaring type.
    #[must_use]
    pub fn type_transactional(mut self, transactional: Transactional) -> Self {
        self.type_transactional = Some(transactional);
        self
    }

    pub const fn declaring_type(&self) -> TypeKey {
        self.declaring_type
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The effective descriptor: method level, else type level.
    pub fn resolve(&self) -> Option<Transactional> {
        self.method_transactional.or(self.type_transactional)
    }

    /// `Type::method`, for logs.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type.simple_name(), self.method)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type.simple_name(), self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeroService;

    #[test]
    fn method_level_wins_over_type_level() {
        let descriptor = MethodDescriptor::of::<HeroService>("save")
            .type_transactional(Transactional::new(Propagation::Supports))
            .transactional(Transactional::new(Propagation::RequiresNew).rollback_only(true));

        let resolved = descriptor.resolve().unwrap();
        assert_eq!(resolved.propagation, Propagation::RequiresNew);
        assert!(resolved.rollback_only);
        assert_eq!(descriptor.qualified_name(), "HeroService::save");
        assert_eq!(descriptor.method(), "save");
    }

    #[test]
    fn type_level_fallback_and_absence() {
        let descriptor = MethodDescriptor::of::<HeroService>("find")
            .type_transactional(Transactional::new(Propagation::Supports));
        assert_eq!(
            descriptor.resolve().map(|t| t.propagation),
            Some(Propagation::Supports)
        );

        assert!(MethodDescriptor::of::<HeroService>("plain").resolve().is_none());
    }

    #[test]
    fn defaults() {
        let transactional = Transactional::default();
        assert_eq!(transactional.propagation, Propagation::Required);
        assert!(!transactional.rollback_only);
    }

    #[test]
    fn propagation_parsing_and_attributes() {
        assert_eq!("requires-new".parse::<Propagation>().unwrap(), Propagation::RequiresNew);
        assert_eq!(" NEVER ".parse::<Propagation>().unwrap(), Propagation::Never);
        assert!("NESTED".parse::<Propagation>().is_err());

        assert_eq!(Propagation::Mandatory.attribute(), Some(TransactionAttribute::Mandatory));
        assert_eq!(Propagation::NotSupported.attribute(), None);
        assert_eq!(Propagation::NotSupported.to_string(), "NOT_SUPPORTED");
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&Propagation::RequiresNew).unwrap();
        assert_eq!(json, "\"REQUIRES_NEW\"");

        let transactional: Transactional =
            serde_json::from_str(r#"{"propagation":"MANDATORY","rollbackOnly":true}"#).unwrap();
        assert_eq!(transactional.propagation, Propagation::Mandatory);
        assert!(transactional.rollback_only);
    }
}
