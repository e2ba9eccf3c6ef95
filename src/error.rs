//! Canonical error taxonomy for the gateway
//!
//! Every failure in the system (backend GraphQL errors, backend HTTP and
//! transport errors, internal validation errors) is converted into a
//! [`NormalizedError`] before it crosses a component boundary. Raw backend
//! messages never reach the client; they are retained under `details` for
//! diagnostics only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter};

// =============================================================================
// ERROR CODES
// =============================================================================

/// Canonical error codes exposed to storefront clients.
///
/// The set is extensible through [`categorize_backend_message`], which maps
/// backend error vocabulary onto these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request shape or content failed validation
    ValidationError,
    /// Serialized request exceeds the configured size cap
    PayloadTooLarge,
    /// Query nesting exceeds the configured depth cap
    QueryTooDeep,
    /// Operation name is not in the allowlist
    OperationNotAllowed,
    /// Operation name could not be resolved at all
    OperationNotFound,
    /// Operation requires a customer token and none was supplied
    AuthenticationRequired,
    /// Backend rejected the supplied credentials
    AuthenticationFailed,
    /// Authenticated but not permitted
    Unauthorized,
    /// Backend demands an authorization the request lacks
    AuthorizationRequired,
    /// Product lookup matched nothing
    ProductNotFound,
    /// Cart id did not resolve to a cart
    CartNotFound,
    /// Cart line item not present in the cart
    CartItemNotFound,
    /// Requested quantity exceeds available stock
    InsufficientStock,
    /// Coupon code rejected
    InvalidCoupon,
    /// Payment step failed
    PaymentError,
    /// Shipping step failed
    ShippingError,
    /// Per-operation or global rate limit hit
    RateLimitExceeded,
    /// Transport-level failure talking to the backend
    NetworkError,
    /// Backend call exceeded its deadline
    Timeout,
    /// Backend unreachable or answering with 5xx
    ServiceUnavailable,
    /// Anything without a more specific mapping
    UnknownError,
}

impl ErrorCode {
    /// Default HTTP status carried by errors of this code.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::PayloadTooLarge => 413,
            ErrorCode::QueryTooDeep => 400,
            ErrorCode::OperationNotAllowed => 403,
            ErrorCode::OperationNotFound => 400,
            ErrorCode::AuthenticationRequired => 401,
            ErrorCode::AuthenticationFailed => 401,
            ErrorCode::Unauthorized => 403,
            ErrorCode::AuthorizationRequired => 403,
            ErrorCode::ProductNotFound => 404,
            ErrorCode::CartNotFound => 404,
            ErrorCode::CartItemNotFound => 404,
            ErrorCode::InsufficientStock => 400,
            ErrorCode::InvalidCoupon => 400,
            ErrorCode::PaymentError => 400,
            ErrorCode::ShippingError => 400,
            ErrorCode::RateLimitExceeded => 429,
            ErrorCode::NetworkError => 502,
            ErrorCode::Timeout => 504,
            ErrorCode::ServiceUnavailable => 503,
            ErrorCode::UnknownError => 500,
        }
    }

    /// Whether a request failing with this code may be re-issued safely.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError | ErrorCode::Timeout | ErrorCode::ServiceUnavailable
        )
    }

    /// Default severity for the code.
    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::ProductNotFound | ErrorCode::CartItemNotFound => Severity::Warn,
            _ => Severity::Error,
        }
    }

    /// User-safe canonical message. Raw backend text never appears here.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "The request is invalid",
            ErrorCode::PayloadTooLarge => "The request payload is too large",
            ErrorCode::QueryTooDeep => "The query is nested too deeply",
            ErrorCode::OperationNotAllowed => "This operation is not allowed",
            ErrorCode::OperationNotFound => "The requested operation does not exist",
            ErrorCode::AuthenticationRequired => "You must be signed in to do this",
            ErrorCode::AuthenticationFailed => "Your session is invalid or has expired",
            ErrorCode::Unauthorized => "You are not authorized to do this",
            ErrorCode::AuthorizationRequired => "Additional authorization is required",
            ErrorCode::ProductNotFound => "The product could not be found",
            ErrorCode::CartNotFound => "The cart could not be found",
            ErrorCode::CartItemNotFound => "The cart item could not be found",
            ErrorCode::InsufficientStock => "The requested quantity is not available",
            ErrorCode::InvalidCoupon => "The coupon code is not valid",
            ErrorCode::PaymentError => "The payment could not be processed",
            ErrorCode::ShippingError => "The shipping selection could not be applied",
            ErrorCode::RateLimitExceeded => "Too many requests, slow down",
            ErrorCode::NetworkError => "The store is temporarily unreachable",
            ErrorCode::Timeout => "The store took too long to respond",
            ErrorCode::ServiceUnavailable => "The store is temporarily unavailable",
            ErrorCode::UnknownError => "Something went wrong",
        }
    }

    /// Coarse classification used for metrics labels.
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::PayloadTooLarge
            | ErrorCode::QueryTooDeep
            | ErrorCode::OperationNotFound => "validation",
            ErrorCode::OperationNotAllowed
            | ErrorCode::AuthenticationRequired
            | ErrorCode::AuthenticationFailed
            | ErrorCode::Unauthorized
            | ErrorCode::AuthorizationRequired => "auth",
            ErrorCode::ProductNotFound | ErrorCode::CartNotFound | ErrorCode::CartItemNotFound => {
                "not_found"
            }
            ErrorCode::InsufficientStock
            | ErrorCode::InvalidCoupon
            | ErrorCode::PaymentError
            | ErrorCode::ShippingError => "commerce",
            ErrorCode::RateLimitExceeded => "rate_limit",
            ErrorCode::NetworkError | ErrorCode::Timeout | ErrorCode::ServiceUnavailable => {
                "upstream"
            }
            ErrorCode::UnknownError => "unknown",
        }
    }
}

/// Error severity, carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Which side of the gateway produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSource {
    Backend,
    Gateway,
}

// =============================================================================
// NORMALIZED ERROR
// =============================================================================

/// The single error currency of the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
    pub http_status: u16,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    pub source: ErrorSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl NormalizedError {
    /// A gateway-sourced error with the code's canonical defaults.
    pub fn gateway(code: ErrorCode) -> Self {
        Self::with_source(code, ErrorSource::Gateway)
    }

    /// A backend-sourced error with the code's canonical defaults.
    pub fn backend(code: ErrorCode) -> Self {
        Self::with_source(code, ErrorSource::Backend)
    }

    fn with_source(code: ErrorCode, source: ErrorSource) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            severity: code.severity(),
            http_status: code.http_status(),
            retryable: code.is_retryable(),
            path: None,
            source,
            details: None,
        }
    }

    /// Override the user-facing message. The replacement must itself be
    /// user-safe; raw backend text belongs in [`Self::detail`].
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn http_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn path(mut self, path: Vec<String>) -> Self {
        self.path = Some(path);
        self
    }

    /// Attach a diagnostic detail. Creates the details map on first use.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for NormalizedError {}

// =============================================================================
// BACKEND ERROR NORMALIZATION
// =============================================================================

/// Map a raw backend error message onto a canonical code.
///
/// Substring matching over the lower-cased message, most specific first.
/// Anything unmatched falls through to [`ErrorCode::UnknownError`].
pub fn categorize_backend_message(raw: &str) -> ErrorCode {
    let msg = raw.to_lowercase();

    if msg.contains("rate limit") || msg.contains("too many requests") {
        ErrorCode::RateLimitExceeded
    } else if msg.contains("coupon") {
        ErrorCode::InvalidCoupon
    } else if (msg.contains("stock") || msg.contains("requested qty")) && !msg.contains("restocked")
    {
        ErrorCode::InsufficientStock
    } else if msg.contains("payment") {
        ErrorCode::PaymentError
    } else if msg.contains("shipping method") || msg.contains("shipping address") {
        ErrorCode::ShippingError
    } else if msg.contains("cart item") && (msg.contains("not found") || msg.contains("no such")) {
        ErrorCode::CartItemNotFound
    } else if msg.contains("cart") && (msg.contains("could not find") || msg.contains("not found"))
    {
        ErrorCode::CartNotFound
    } else if msg.contains("authorization") || msg.contains("not authorized") {
        ErrorCode::Unauthorized
    } else if msg.contains("authentication")
        || msg.contains("not logged in")
        || msg.contains("token is expired")
    {
        ErrorCode::AuthenticationFailed
    } else if msg.contains("no such entity")
        || (msg.contains("product") && msg.contains("not found"))
    {
        ErrorCode::ProductNotFound
    } else {
        ErrorCode::UnknownError
    }
}

/// Normalize a backend-reported GraphQL error entry.
///
/// The canonical message is always the mapped one; the backend's own text is
/// kept under `details.backend_message`.
pub fn normalize_backend_graphql_error(
    raw_message: &str,
    path: Option<Vec<String>>,
) -> NormalizedError {
    let code = categorize_backend_message(raw_message);
    let mut error = NormalizedError::backend(code).detail("backend_message", raw_message);
    if let Some(path) = path {
        error = error.path(path);
    }
    error
}

/// Normalize a backend user-level error (`user_errors` alongside success data).
///
/// Same category map as GraphQL errors, but these are always client-caused:
/// severity Error, http 400, never retryable.
pub fn normalize_backend_user_error(raw_message: &str) -> NormalizedError {
    let code = categorize_backend_message(raw_message);
    NormalizedError::backend(code)
        .severity(Severity::Error)
        .http_status(400)
        .retryable(false)
        .detail("backend_message", raw_message)
}

/// Normalize a non-2xx backend HTTP status.
pub fn normalize_backend_http_status(status: u16) -> NormalizedError {
    let code = match status {
        401 => ErrorCode::AuthenticationFailed,
        403 => ErrorCode::Unauthorized,
        408 => ErrorCode::Timeout,
        429 => ErrorCode::RateLimitExceeded,
        500..=599 => ErrorCode::ServiceUnavailable,
        _ => ErrorCode::UnknownError,
    };
    NormalizedError::backend(code).detail("backend_http_status", status)
}
