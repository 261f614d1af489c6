//! Declarative transactions for Ormwire.
//!
//! Methods are registered with a [`MethodDescriptor`] carrying the requested
//! [`Propagation`]. A [`TransactionalInterceptor`] binds the descriptor to a
//! [`TransactionAttribute`] policy and runs the method between the policy's
//! `begin` and `finish`, against an external [`TransactionManager`].
//!
//! ```ignore
//! let interceptor = TransactionalInterceptor::new(manager, resources);
//! let save = interceptor.bind(
//!     &MethodDescriptor::of::<HeroService>("save").transactional(Transactional::default()),
//! );
//! save.invoke(|| service.save(&hero))?;
//! ```

pub mod attribute;
pub mod interceptor;
pub mod manager;
pub mod transactional;

pub use attribute::{TransactionAttribute, TransactionToken};
pub use interceptor::{TransactionalInterceptor, TransactionalMethod};
pub use manager::{
    ResourceProvider, Transaction, TransactionManager, TransactionStatus, TransactionalResource,
};
pub use transactional::{MethodDescriptor, Propagation, Transactional};
