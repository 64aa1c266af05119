use thiserror::Error;

/// Podgate error types
#[derive(Error, Debug)]
pub enum GateError {
    /// Failure reported by a backend, relayed with its text unchanged
    #[error("{0}")]
    Backend(String),

    /// Referenced sandbox, container or image does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request content the backend refuses to act on
    #[error("{0}")]
    InvalidArgument(String),

    /// Object is not in a state that allows the operation
    #[error("{0}")]
    FailedPrecondition(String),

    /// Operation deliberately not supported by the adapter
    #[error("{operation}: not implemented")]
    Unsupported { operation: &'static str },

    /// gRPC status produced by a backend, relayed as-is
    #[error("gRPC error: {0}")]
    GrpcError(#[from] tonic::Status),

    /// Listener or socket failure
    #[error("Transport error: {0}")]
    TransportError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_yaml::Error> for GateError {
    fn from(err: serde_yaml::Error) -> Self {
        GateError::SerializationError(err.to_string())
    }
}

impl From<tonic::transport::Error> for GateError {
    fn from(err: tonic::transport::Error) -> Self {
        GateError::TransportError(err.to_string())
    }
}

/// Result type alias for Podgate operations
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_is_verbatim() {
        let error = GateError::Backend("image not found".to_string());
        assert_eq!(error.to_string(), "image not found");
    }

    #[test]
    fn test_not_found_display_is_verbatim() {
        let error = GateError::NotFound("pod sandbox sbx-1 not found".to_string());
        assert_eq!(error.to_string(), "pod sandbox sbx-1 not found");
    }

    #[test]
    fn test_unsupported_display() {
        let error = GateError::Unsupported { operation: "Exec" };
        assert_eq!(error.to_string(), "Exec: not implemented");
    }

    #[test]
    fn test_config_error_display() {
        let error = GateError::ConfigError("socket path is empty".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: socket path is empty"
        );
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: GateError = io.into();
        assert!(matches!(error, GateError::IoError(_)));
        assert!(error.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_status_from() {
        let error: GateError = tonic::Status::not_found("gone").into();
        match error {
            GateError::GrpcError(status) => {
                assert_eq!(status.code(), tonic::Code::NotFound);
                assert_eq!(status.message(), "gone");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_yaml_error_from() {
        let err = serde_yaml::from_str::<std::collections::HashMap<String, u32>>("a: [")
            .unwrap_err();
        let error: GateError = err.into();
        assert!(matches!(error, GateError::SerializationError(_)));
    }
}
