//! Configuration building for Ormwire.
//!
//! [`ConfigurationProvider`] gathers settings, type aliases, type handlers,
//! mappers, plugins and callbacks, then assembles a
//! [`Configuration`](ormwire_core::Configuration) in a fixed order. Scalar
//! flags can also be supplied as named [`Bindings`].

pub mod bindings;
pub mod error;
pub mod provider;
pub mod setting;

pub use bindings::Bindings;
pub use error::ProvisionError;
pub use provider::ConfigurationProvider;
pub use setting::ConfigurationSetting;
