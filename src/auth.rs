//! Authentication gate and backend auth header assembly.
//!
//! This component never validates token authenticity; a bad token is the
//! backend's to reject, and its auth error comes back normalized like any
//! other backend error.

use crate::context::RequestContext;
use crate::registry::OperationRegistry;

/// Outcome of the pre-backend authentication check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub required: bool,
    /// User-facing message when the requirement is unmet.
    pub error: Option<String>,
}

impl AuthDecision {
    pub fn satisfied() -> Self {
        Self {
            required: false,
            error: None,
        }
    }
}

/// Decide whether the operation may proceed without contacting the backend.
///
/// Returns `required=true` with a message when the operation needs a customer
/// token and none is present; the caller fails the request with
/// AUTHENTICATION_REQUIRED before any backend call.
pub fn requires_authentication(
    registry: &OperationRegistry,
    operation: &str,
    has_customer_token: bool,
) -> AuthDecision {
    let Some(definition) = registry.get(operation) else {
        return AuthDecision::satisfied();
    };
    if definition.requires_auth && !has_customer_token {
        AuthDecision {
            required: true,
            error: Some(format!("Operation '{operation}' requires a signed-in customer")),
        }
    } else {
        AuthDecision::satisfied()
    }
}

/// Backend authorization headers derived from the context tokens.
///
/// Token values pass through untransformed.
pub fn build_backend_auth_headers(ctx: &RequestContext) -> Vec<(&'static str, String)> {
    let mut headers = Vec::with_capacity(2);
    if let Some(token) = &ctx.customer_token {
        headers.push(("Authorization", format!("Bearer {token}")));
    }
    if let Some(token) = &ctx.cart_token {
        headers.push(("X-Cart-Token", token.clone()));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StoreDefaults;
    use std::collections::HashMap;

    fn ctx(customer: Option<&str>, cart: Option<&str>) -> RequestContext {
        let mut context = RequestContext::from_transport(
            &HashMap::new(),
            &HashMap::new(),
            &StoreDefaults::default(),
        );
        context.customer_token = customer.map(str::to_string);
        context.cart_token = cart.map(str::to_string);
        context
    }

    #[test]
    fn auth_required_without_token() {
        let registry = OperationRegistry::with_defaults();
        let decision = requires_authentication(&registry, "GetCustomer", false);
        assert!(decision.required);
        assert!(decision.error.unwrap().contains("GetCustomer"));
    }

    #[test]
    fn auth_satisfied_with_token() {
        let registry = OperationRegistry::with_defaults();
        let decision = requires_authentication(&registry, "GetCustomer", true);
        assert_eq!(decision, AuthDecision::satisfied());
    }

    #[test]
    fn public_operations_never_require_auth() {
        let registry = OperationRegistry::with_defaults();
        assert!(!requires_authentication(&registry, "GetProducts", false).required);
        assert!(!requires_authentication(&registry, "AddToCart", false).required);
    }

    #[test]
    fn headers_pass_tokens_through_untransformed() {
        let headers = build_backend_auth_headers(&ctx(Some("tok en"), Some("cart-1")));
        assert_eq!(headers[0], ("Authorization", "Bearer tok en".to_string()));
        assert_eq!(headers[1], ("X-Cart-Token", "cart-1".to_string()));
    }

    #[test]
    fn no_tokens_no_headers() {
        assert!(build_backend_auth_headers(&ctx(None, None)).is_empty());
    }
}
