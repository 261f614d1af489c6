//! Statement interceptors (plugins).

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::mapping::MappedStatement;

/// Hook that sees, and may rewrite, the SQL of every statement.
pub trait Interceptor: Send + Sync + fmt::Debug {
    fn intercept(&self, statement: &MappedStatement, sql: String) -> Result<String>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Ordered list of interceptors applied one after another.
#[derive(Debug, Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        tracing::debug!(plugin = interceptor.name(), "Added interceptor");
        self.interceptors.push(interceptor);
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run `sql` through every interceptor in registration order.
    pub fn apply(&self, statement: &MappedStatement, sql: String) -> Result<String> {
        self.interceptors
            .iter()
            .try_fold(sql, |sql, interceptor| interceptor.intercept(statement, sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mapping::StatementKind;

    #[derive(Debug)]
    struct Comment(&'static str);

    impl Interceptor for Comment {
        fn intercept(&self, _statement: &MappedStatement, sql: String) -> Result<String> {
            Ok(format!("{sql} /* {} */", self.0))
        }
    }

    #[derive(Debug)]
    struct Deny;

    impl Interceptor for Deny {
        fn intercept(&self, statement: &MappedStatement, _sql: String) -> Result<String> {
            Err(Error::Custom(format!("{} denied", statement.id)))
        }
    }

    fn statement() -> MappedStatement {
        MappedStatement {
            id: "app.HeroMapper.findAll".to_string(),
            namespace: "app.HeroMapper".to_string(),
            kind: StatementKind::Select,
            sql: "SELECT * FROM heroes".to_string(),
            result_map: None,
            result_type: None,
            timeout: None,
            fetch_size: None,
        }
    }

    #[test]
    fn applies_in_registration_order() {
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(Comment("first")));
        chain.add_interceptor(Arc::new(Comment("second")));

        let stmt = statement();
        let sql = chain.apply(&stmt, stmt.sql.clone()).unwrap();
        assert_eq!(sql, "SELECT * FROM heroes /* first */ /* second */");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn stops_at_first_failure() {
        let mut chain = InterceptorChain::new();
        chain.add_interceptor(Arc::new(Deny));
        chain.add_interceptor(Arc::new(Comment("never")));

        let stmt = statement();
        let err = chain.apply(&stmt, stmt.sql.clone()).unwrap_err();
        assert_eq!(err.to_string(), "app.HeroMapper.findAll denied");
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = InterceptorChain::new();
        let stmt = statement();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(&stmt, stmt.sql.clone()).unwrap(), stmt.sql);
    }
}
