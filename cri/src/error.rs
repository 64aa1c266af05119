//! CRI-specific error conversions.

use podgate_core::GateError;
use tonic::Status;

/// Convert a GateError to a gRPC Status.
///
/// The status message is always the error's display text, so a backend's
/// error content reaches the caller unchanged. The variant only selects the
/// status code the backend asked for.
pub fn gate_error_to_status(err: GateError) -> Status {
    match err {
        GateError::GrpcError(status) => status,
        GateError::Backend(msg) => Status::unknown(msg),
        GateError::NotFound(msg) => Status::not_found(msg),
        GateError::InvalidArgument(msg) => Status::invalid_argument(msg),
        GateError::FailedPrecondition(msg) => Status::failed_precondition(msg),
        err @ GateError::Unsupported { .. } => Status::unimplemented(err.to_string()),
        other => Status::unknown(other.to_string()),
    }
}

/// Log a failed backend call and turn its error into the response status.
pub(crate) fn backend_failure(operation: &'static str, err: GateError) -> Status {
    tracing::error!(operation, error = %err, "{} from backend failed", operation);
    gate_error_to_status(err)
}
