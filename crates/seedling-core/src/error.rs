// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for Seedling operations
#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    /// Malformed CIDR string
    #[error("Invalid CIDR '{cidr}': {reason}")]
    #[diagnostic(
        code(seedling::invalid_cidr),
        help("Use a network in CIDR notation like '10.250.0.0/16' or 'fd00::/64'")
    )]
    InvalidCidr {
        #[allow(unused)]
        cidr: String,
        #[allow(unused)]
        reason: String,
    },

    /// Label selector that cannot be evaluated
    #[error("Invalid label selector: {reason}")]
    #[diagnostic(
        code(seedling::invalid_selector),
        help("'In' and 'NotIn' need at least one value, 'Exists' and 'DoesNotExist' must not have values")
    )]
    InvalidSelector {
        #[allow(unused)]
        reason: String,
    },

    /// Invalid resource
    #[error("Invalid {kind} resource: {reason}")]
    #[diagnostic(
        code(seedling::invalid_resource),
        help("Every resource needs a DNS-1123 compliant metadata.name; shoots also need a namespace")
    )]
    InvalidResource {
        #[allow(unused)]
        kind: String,
        #[allow(unused)]
        reason: String,
    },

    /// Two resources of the same kind share a key within one snapshot
    #[error("Duplicate {kind} in snapshot: {key}")]
    #[diagnostic(
        code(seedling::duplicate_resource),
        help("A snapshot must contain each seed, shoot and cloud profile at most once")
    )]
    DuplicateResource {
        #[allow(unused)]
        kind: String,
        #[allow(unused)]
        key: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(seedling::serialization_error),
        help("Ensure the manifest format is valid JSON or YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error while reading a manifest
    #[error("Failed to read {path}: {message}")]
    #[diagnostic(
        code(seedling::io_error),
        help("Check that the file exists and is readable")
    )]
    IoError {
        #[allow(unused)]
        path: String,
        #[allow(unused)]
        message: String,
    },
}

/// Result type alias for Seedling core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an InvalidCidr error
    pub fn invalid_cidr(cidr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCidr {
            cidr: cidr.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidSelector error
    pub fn invalid_selector(reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            reason: reason.into(),
        }
    }

    /// Create an InvalidResource error
    pub fn invalid_resource(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResource {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Create a DuplicateResource error
    pub fn duplicate_resource(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DuplicateResource {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create an IoError
    pub fn io_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::invalid_cidr("10.0.0.0/33", "prefix length out of range");
        assert!(matches!(err, CoreError::InvalidCidr { .. }));
        assert!(err.to_string().contains("10.0.0.0/33"));

        let err = CoreError::duplicate_resource("Seed", "aws-eu1");
        assert!(matches!(err, CoreError::DuplicateResource { .. }));
    }
}
