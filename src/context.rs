//! Per-request context derived from transport headers and cookies.
//!
//! Construction never fails and never validates: a missing or malformed token
//! is carried as absent, and the auth handler downstream decides what that
//! means.

use std::collections::HashMap;
use uuid::Uuid;

/// Store-scoped defaults applied when the request carries no override headers.
#[derive(Debug, Clone)]
pub struct StoreDefaults {
    pub store_code: String,
    pub locale: String,
    pub currency: String,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            store_code: "default".to_string(),
            locale: "en_US".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// Read-only after construction, except the cart token which the cart handler
/// may populate during the same request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: String,
    pub store_code: String,
    pub locale: String,
    pub currency: String,
    pub customer_token: Option<String>,
    pub cart_token: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Derive a context from lower-cased header and cookie maps.
    pub fn from_transport(
        headers: &HashMap<String, String>,
        cookies: &HashMap<String, String>,
        defaults: &StoreDefaults,
    ) -> Self {
        let correlation_id = headers
            .get("x-correlation-id")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let customer_token = headers
            .get("authorization")
            .and_then(|v| parse_bearer(v))
            .or_else(|| cookies.get("customer-token").map(|v| v.trim().to_string()))
            .filter(|v| !v.is_empty());

        let cart_token = headers
            .get("x-cart-token")
            .map(|v| v.trim().to_string())
            .or_else(|| cookies.get("cart-token").map(|v| v.trim().to_string()))
            .filter(|v| !v.is_empty());

        let client_ip = headers
            .get("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            correlation_id,
            store_code: header_or(headers, "x-store-code", &defaults.store_code),
            locale: header_or(headers, "x-locale", &defaults.locale),
            currency: header_or(headers, "x-currency", &defaults.currency),
            customer_token,
            cart_token,
            client_ip,
            user_agent: headers.get("user-agent").cloned(),
        }
    }

    pub fn has_customer_token(&self) -> bool {
        self.customer_token.is_some()
    }
}

fn header_or(headers: &HashMap<String, String>, name: &str, default: &str) -> String {
    headers
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

/// Extract the token from a `Bearer <token>` value, scheme case-insensitive.
fn parse_bearer(value: &str) -> Option<String> {
    let value = value.trim();
    let scheme = value.get(..7)?;
    if !scheme.eq_ignore_ascii_case("bearer ") {
        return None;
    }
    let token = value[7..].trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn generates_correlation_id_when_absent() {
        let ctx =
            RequestContext::from_transport(&headers(&[]), &headers(&[]), &StoreDefaults::default());
        assert_eq!(ctx.correlation_id.len(), 36);
    }

    #[test]
    fn passes_through_correlation_id() {
        let ctx = RequestContext::from_transport(
            &headers(&[("x-correlation-id", "abc-123")]),
            &headers(&[]),
            &StoreDefaults::default(),
        );
        assert_eq!(ctx.correlation_id, "abc-123");
    }

    #[test]
    fn bearer_parsing_is_case_insensitive() {
        let ctx = RequestContext::from_transport(
            &headers(&[("authorization", "BEARER tok-1")]),
            &headers(&[]),
            &StoreDefaults::default(),
        );
        assert_eq!(ctx.customer_token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn cookie_fallbacks() {
        let ctx = RequestContext::from_transport(
            &headers(&[]),
            &headers(&[("customer-token", "c1"), ("cart-token", "k1")]),
            &StoreDefaults::default(),
        );
        assert_eq!(ctx.customer_token.as_deref(), Some("c1"));
        assert_eq!(ctx.cart_token.as_deref(), Some("k1"));
    }

    #[test]
    fn header_beats_cookie_for_cart_token() {
        let ctx = RequestContext::from_transport(
            &headers(&[("x-cart-token", "from-header")]),
            &headers(&[("cart-token", "from-cookie")]),
            &StoreDefaults::default(),
        );
        assert_eq!(ctx.cart_token.as_deref(), Some("from-header"));
    }

    #[test]
    fn first_forwarded_ip_wins() {
        let ctx = RequestContext::from_transport(
            &headers(&[("x-forwarded-for", " 10.0.0.1 , 172.16.0.9")]),
            &headers(&[]),
            &StoreDefaults::default(),
        );
        assert_eq!(ctx.client_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn malformed_authorization_is_absent_not_rejected() {
        let ctx = RequestContext::from_transport(
            &headers(&[("authorization", "Basic dXNlcjpwYXNz")]),
            &headers(&[]),
            &StoreDefaults::default(),
        );
        assert!(ctx.customer_token.is_none());
    }

    #[test]
    fn store_defaults_apply() {
        let defaults = StoreDefaults {
            store_code: "eu".into(),
            locale: "de_DE".into(),
            currency: "EUR".into(),
        };
        let ctx = RequestContext::from_transport(
            &headers(&[("x-currency", "CHF")]),
            &headers(&[]),
            &defaults,
        );
        assert_eq!(ctx.store_code, "eu");
        assert_eq!(ctx.locale, "de_DE");
        assert_eq!(ctx.currency, "CHF");
    }
}
