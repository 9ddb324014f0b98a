use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Domain not found (NXDOMAIN)")]
    NxDomain,

    #[error("Upstream server failure: {0}")]
    ServerFailure(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Resolution failed for {hostname}: {reason}")]
    ResolutionFailed { hostname: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Authoritative negative answer: the name does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NxDomain)
    }

    /// Failures worth another attempt against the same or the next upstream.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::QueryTimeout
                | DomainError::TransportTimeout { .. }
                | DomainError::TransportConnectionRefused { .. }
                | DomainError::InvalidDnsResponse(_)
                | DomainError::IoError(_)
                | DomainError::ServerFailure(_)
        )
    }
}
