//! Execution context threaded through providers and migrations.

/// Who a catalog lookup or migration runs as.
///
/// Conversion of stored dashboards is background work, so it runs under a
/// service identity rather than the identity of whichever user happened to
/// trigger the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionIdentity {
    /// Namespace-scoped background service account.
    Service,
    /// An end user, identified by their subject id.
    User(String),
}

/// Explicit parameter object passed to every provider and migration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionContext {
    pub namespace: String,
    pub identity: ExecutionIdentity,
}

impl ConversionContext {
    /// Service-identity context for background conversions in a namespace.
    pub fn service(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            identity: ExecutionIdentity::Service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_context() {
        let ctx = ConversionContext::service("org-12");
        assert_eq!(ctx.namespace, "org-12");
        assert_eq!(ctx.identity, ExecutionIdentity::Service);
    }
}
