//! Cart token resolution and guest→customer cart merge sequencing.
//!
//! The handler never mints a guest cart itself. A logged-in customer's cart
//! is resolved by the backend on first access, and guests arrive with a token
//! from an earlier backend interaction. What this handler owns is sequencing:
//! when a request carries both a customer token and a guest cart token, the
//! merge runs before the translated operation, and the guest token is
//! invalidated in context on success. Idempotency of the merge itself is the
//! backend's contract.

use crate::backend::{BackendResponse, GraphqlBackend};
use crate::context::RequestContext;
use crate::error::NormalizedError;
use crate::metrics::METRICS;
use crate::translate::Translator;
use crate::translate::checkout::CheckoutTranslator;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Canonical operation name prefixes that are cart-scoped.
pub const CART_OPERATION_PREFIXES: &[&str] = &[
    "GetCart",
    "AddToCart",
    "UpdateCart",
    "RemoveCart",
    "ApplyCoupon",
    "RemoveCoupon",
    "SetShipping",
    "SetPayment",
    "PlaceOrder",
    "MergeCart",
];

pub fn is_cart_scoped(operation: &str) -> bool {
    CART_OPERATION_PREFIXES
        .iter()
        .any(|prefix| operation.starts_with(prefix))
}

/// The cart token to use for a cart-scoped operation: whatever the context
/// already carries, unchanged. Absence is not an error here.
pub fn ensure_cart_token(ctx: &RequestContext) -> Option<String> {
    ctx.cart_token.clone()
}

/// Run the guest→customer merge when the request carries both tokens.
///
/// On success the merged cart id replaces the guest token in context. On
/// failure the context is left untouched and the normalized errors are
/// returned for the response; the translated operation still runs.
pub async fn prepare_cart(
    backend: &dyn GraphqlBackend,
    ctx: &mut RequestContext,
) -> Vec<NormalizedError> {
    if ctx.customer_token.is_none() || ctx.cart_token.is_none() {
        return Vec::new();
    }

    let translator = CheckoutTranslator;
    let request = match translator.translate("MergeCarts", &Map::new(), ctx) {
        Ok(request) => request,
        Err(error) => {
            warn!(correlation_id = %ctx.correlation_id, %error, "cart merge translation failed");
            return Vec::new();
        }
    };

    METRICS.cart_merges_total.inc();
    let BackendResponse { data, errors } = backend.execute(&request, ctx).await;
    if !errors.is_empty() {
        warn!(
            correlation_id = %ctx.correlation_id,
            error_count = errors.len(),
            "guest cart merge failed, continuing with guest cart"
        );
        return errors;
    }

    let merged_id = data
        .as_ref()
        .and_then(|d| d.get("mergeCarts"))
        .and_then(|c| c.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(merged_id) = merged_id {
        info!(correlation_id = %ctx.correlation_id, "guest cart merged into customer cart");
        ctx.cart_token = Some(merged_id);
    }
    Vec::new()
}
