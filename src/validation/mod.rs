//! Request validation: shape, size, depth, and allowlist membership.
//!
//! Checks run in a fixed order and short-circuit on the first failure. All of
//! them are pure; no I/O happens before a request has passed validation.

pub mod bounds;

pub use bounds::{DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_MAX_QUERY_DEPTH, ValidationLimits, scan_depth};

use crate::error::{ErrorCode, NormalizedError};
use crate::model::CanonicalRequest;
use crate::registry::OperationRegistry;
use bounds::MAX_NAMES_IN_ERROR;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static OPERATION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:query|mutation|subscription)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("operation name pattern is valid")
});

/// Derive the operation name: explicit `operationName` wins, otherwise the
/// leading `query|mutation|subscription <Name>` token of the document.
pub fn resolve_operation_name(request: &CanonicalRequest) -> Option<String> {
    if let Some(name) = &request.operation_name {
        let name = name.trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    OPERATION_NAME
        .captures(&request.query)
        .map(|caps| caps[1].to_string())
}

/// Validate a canonical request, returning the resolved operation name.
///
/// Check order follows the request lifecycle: presence, size, name
/// resolution, allowlist membership, depth, variable shape.
pub fn validate_request(
    request: &CanonicalRequest,
    registry: &OperationRegistry,
    limits: &ValidationLimits,
) -> Result<String, NormalizedError> {
    if request.query.trim().is_empty() {
        return Err(NormalizedError::gateway(ErrorCode::ValidationError)
            .message("The request must include a non-empty GraphQL query"));
    }

    let payload_bytes = serde_json::to_vec(request).map(|b| b.len()).unwrap_or(0);
    if payload_bytes > limits.max_payload_bytes {
        return Err(NormalizedError::gateway(ErrorCode::PayloadTooLarge)
            .detail("payload_bytes", payload_bytes)
            .detail("max_payload_bytes", limits.max_payload_bytes));
    }

    let Some(operation_name) = resolve_operation_name(request) else {
        return Err(NormalizedError::gateway(ErrorCode::ValidationError).message(
            "Unable to determine the operation name; supply operationName explicitly \
             or name the document, e.g. `query GetProducts { ... }`",
        ));
    };

    if !registry.is_allowed(&operation_name) {
        let mut names = registry.all_names();
        let truncated = names.len() > MAX_NAMES_IN_ERROR;
        names.truncate(MAX_NAMES_IN_ERROR);
        let mut listing = names.join(", ");
        if truncated {
            listing.push_str(", …");
        }
        return Err(NormalizedError::gateway(ErrorCode::OperationNotAllowed)
            .message(format!(
                "Operation '{operation_name}' is not allowed. Allowed operations: {listing}"
            ))
            .detail("operation", operation_name));
    }

    let depth = scan_depth(&request.query);
    if depth > limits.max_query_depth {
        return Err(NormalizedError::gateway(ErrorCode::QueryTooDeep)
            .detail("depth", depth)
            .detail("max_depth", limits.max_query_depth));
    }

    match &request.variables {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(_) => {
            return Err(NormalizedError::gateway(ErrorCode::ValidationError)
                .message("`variables` must be an object"));
        }
    }

    Ok(operation_name)
}
