//! Reconciliation error taxonomy

use crate::provider::ResourceKind;
use thiserror::Error;

/// Classified error kinds used for reconciler branching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The remote object does not exist
    NotFound,
    /// The remote object is busy (e.g. mid-operation)
    Locked,
    /// The platform rejected the call because of rate limiting
    RateLimited,
    /// The platform failed internally (5xx)
    InternalUnknown,
    /// The response body did not have the expected shape
    MalformedResponse,
    /// Desired state conflicts with an existing remote object
    ConfigurationMismatch,
    /// The requested change has no in-place implementation
    Unsupported,
    /// Anything the taxonomy does not cover
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::Locked => write!(f, "locked"),
            ErrorKind::RateLimited => write!(f, "rate-limited"),
            ErrorKind::InternalUnknown => write!(f, "internal"),
            ErrorKind::MalformedResponse => write!(f, "malformed-response"),
            ErrorKind::ConfigurationMismatch => write!(f, "configuration-mismatch"),
            ErrorKind::Unsupported => write!(f, "unsupported"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Reconciliation errors
///
/// Every variant that concerns a remote object names the resource kind and
/// identity so the orchestrator can point at the failing plan entry.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("No {kind} match found for {filter}")]
    NoMatch { kind: ResourceKind, filter: String },

    #[error("{kind} {id} is locked: {message}")]
    Locked {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    // No retry happens here. Callers see this as a hard failure.
    #[error("API rate limit exceeded ({kind} {id}): {message}")]
    RateLimited {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("Internal API error ({kind} {id}): {message}")]
    InternalUnknown {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("Malformed API response ({kind} {id}): {message}")]
    MalformedResponse {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("{kind} configuration mismatch: {message}")]
    ConfigurationMismatch { kind: ResourceKind, message: String },

    #[error("Unsupported {kind} change ({id}): {message}")]
    Unsupported {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("API error ({kind} {id}): {message}")]
    Api {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("Transport error ({kind} {id}): {message}")]
    Transport {
        kind: ResourceKind,
        id: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider has not been configured")]
    NotConfigured,

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Returns the taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudError::NotFound { .. } | CloudError::NoMatch { .. } => ErrorKind::NotFound,
            CloudError::Locked { .. } => ErrorKind::Locked,
            CloudError::RateLimited { .. } => ErrorKind::RateLimited,
            CloudError::InternalUnknown { .. } => ErrorKind::InternalUnknown,
            CloudError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            CloudError::ConfigurationMismatch { .. } => ErrorKind::ConfigurationMismatch,
            CloudError::Unsupported { .. } => ErrorKind::Unsupported,
            CloudError::Api { .. }
            | CloudError::Transport { .. }
            | CloudError::InvalidConfig(_)
            | CloudError::NotConfigured
            | CloudError::UnknownResourceType(_)
            | CloudError::Json(_) => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn mismatch(kind: ResourceKind, message: impl Into<String>) -> Self {
        CloudError::ConfigurationMismatch {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(kind: ResourceKind, id: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::Unsupported {
            kind,
            id: id.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = CloudError::NotFound {
            kind: ResourceKind::Disk,
            id: "d-1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_not_found());

        let err = CloudError::NoMatch {
            kind: ResourceKind::Location,
            filter: "slug: tll".to_string(),
        };
        assert!(err.is_not_found());

        let err = CloudError::mismatch(ResourceKind::FloatingIp, "name differs");
        assert_eq!(err.kind(), ErrorKind::ConfigurationMismatch);
        assert!(!err.is_not_found());

        assert_eq!(CloudError::NotConfigured.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = CloudError::Locked {
            kind: ResourceKind::VirtualMachine,
            id: "vm-1".to_string(),
            message: "[409] busy".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("virtual machine"));
        assert!(text.contains("vm-1"));
        assert!(text.contains("[409] busy"));
    }
}
