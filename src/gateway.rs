//! Gateway orchestrator: the end-to-end request pipeline.
//!
//! Strictly sequential per request: parse, context, validate, authorize,
//! cart preparation, translate, execute, normalize, emit. Validator and
//! authorization failures short-circuit with their own HTTP status before any
//! backend call; once a backend call has happened, the envelope status is 200
//! and errors travel in the response body.

use crate::auth::requires_authentication;
use crate::backend::{GraphqlBackend, RetryPolicy, execute_with_retry};
use crate::cache::ResponseCache;
use crate::cart::{ensure_cart_token, is_cart_scoped, prepare_cart};
use crate::context::{RequestContext, StoreDefaults};
use crate::error::{ErrorCode, NormalizedError};
use crate::metrics::METRICS;
use crate::model::{CanonicalRequest, CanonicalResponse};
use crate::registry::OperationRegistry;
use crate::translate::TranslatorRegistry;
use crate::translate::wire::collect_user_errors;
use crate::validation::{ValidationLimits, validate_request};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the thin HTTP entrypoint needs to frame a response.
#[derive(Debug)]
pub struct GatewayReply {
    pub status: u16,
    pub correlation_id: String,
    pub response: CanonicalResponse,
}

pub struct Gateway {
    registry: OperationRegistry,
    translators: TranslatorRegistry,
    backend: Arc<dyn GraphqlBackend>,
    cache: Option<Arc<ResponseCache>>,
    defaults: StoreDefaults,
    limits: ValidationLimits,
    retry: RetryPolicy,
}

impl Gateway {
    pub fn new(
        registry: OperationRegistry,
        translators: TranslatorRegistry,
        backend: Arc<dyn GraphqlBackend>,
        cache: Option<Arc<ResponseCache>>,
        defaults: StoreDefaults,
        limits: ValidationLimits,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            translators,
            backend,
            cache,
            defaults,
            limits,
            retry,
        }
    }

    /// Run one canonical request through the full pipeline.
    pub async fn handle(
        &self,
        body: &[u8],
        headers: &HashMap<String, String>,
        cookies: &HashMap<String, String>,
    ) -> GatewayReply {
        let started = Instant::now();
        let mut ctx = RequestContext::from_transport(headers, cookies, &self.defaults);

        if body.len() > self.limits.max_payload_bytes {
            let error = NormalizedError::gateway(ErrorCode::PayloadTooLarge)
                .detail("payload_bytes", body.len());
            return self.reject(ctx, "unknown", error, started);
        }
        let request: CanonicalRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(parse_error) => {
                let error = NormalizedError::gateway(ErrorCode::ValidationError)
                    .message("The request body must be a JSON object with a `query` field")
                    .detail("parse_error", parse_error.to_string());
                return self.reject(ctx, "unknown", error, started);
            }
        };

        let operation = match validate_request(&request, &self.registry, &self.limits) {
            Ok(operation) => operation,
            Err(error) => return self.reject(ctx, "unknown", error, started),
        };

        let decision =
            requires_authentication(&self.registry, &operation, ctx.has_customer_token());
        if decision.required {
            let mut error = NormalizedError::gateway(ErrorCode::AuthenticationRequired);
            if let Some(message) = decision.error {
                error = error.message(message);
            }
            return self.reject(ctx, &operation, error, started);
        }

        let mut collected: Vec<NormalizedError> = Vec::new();
        if is_cart_scoped(&operation) {
            collected.extend(prepare_cart(self.backend.as_ref(), &mut ctx).await);
            if ensure_cart_token(&ctx).is_none() {
                // Not rejected: the backend's missing-cart error is the answer.
                debug!(correlation_id = %ctx.correlation_id, %operation, "no cart token in context");
            }
        }

        let Some(translator) = self.translators.lookup(&operation) else {
            let error = NormalizedError::gateway(ErrorCode::OperationNotFound)
                .message(format!("Translator not found for operation '{operation}'"))
                .http_status(501);
            return self.reject(ctx, &operation, error, started);
        };

        let variables = request.variable_map();
        let backend_request = match translator.translate(&operation, &variables, &ctx) {
            Ok(backend_request) => backend_request,
            Err(translate_error) => {
                let error = NormalizedError::gateway(ErrorCode::UnknownError)
                    .message(format!("Failed to translate operation '{operation}'"))
                    .http_status(500)
                    .detail("reason", translate_error.to_string());
                return self.reject(ctx, &operation, error, started);
            }
        };

        if let Some(cache) = self.cache.as_ref().filter(|c| c.cacheable(&operation)) {
            if let Some(data) = cache.get(&operation, &variables) {
                METRICS.cache_hits_total.inc();
                return self.emit(ctx, &operation, Some(data), collected, started);
            }
            METRICS.cache_misses_total.inc();
        }

        let response =
            execute_with_retry(self.backend.as_ref(), &backend_request, &ctx, &self.retry).await;
        collected.extend(response.errors);

        let mut data_out: Option<Value> = None;
        if let Some(data) = response.data {
            collected.extend(collect_user_errors(&data));

            let mut effective = data;
            if let Some(followup_request) =
                translator.followup(&operation, &variables, &ctx, &effective)
            {
                METRICS.category_fallback_total.inc();
                info!(correlation_id = %ctx.correlation_id, %operation, "running compensating follow-up query");
                let second = execute_with_retry(
                    self.backend.as_ref(),
                    &followup_request,
                    &ctx,
                    &self.retry,
                )
                .await;
                collected.extend(second.errors);
                if let Some(second_data) = second.data {
                    effective = second_data;
                }
            }

            // Success data is never discarded because normalization had a
            // defect; degrade to the raw backend payload instead.
            data_out = Some(match translator.normalize(&operation, &effective, &ctx) {
                Ok(canonical) => {
                    if collected.is_empty()
                        && let Some(cache) =
                            self.cache.as_ref().filter(|c| c.cacheable(&operation))
                    {
                        cache.put(&operation, &variables, canonical.clone());
                    }
                    canonical
                }
                Err(normalize_error) => {
                    warn!(
                        correlation_id = %ctx.correlation_id,
                        %operation,
                        error = %normalize_error,
                        "normalization failed, returning raw backend data"
                    );
                    effective
                }
            });
        }

        self.emit(ctx, &operation, data_out, collected, started)
    }

    /// Terminal pre-backend failure: the reply carries the error's own status.
    fn reject(
        &self,
        ctx: RequestContext,
        operation: &str,
        error: NormalizedError,
        started: Instant,
    ) -> GatewayReply {
        METRICS.record_request(operation, false, started.elapsed().as_secs_f64());
        METRICS.record_error(operation, &error.code.to_string());
        debug!(
            correlation_id = %ctx.correlation_id,
            operation,
            code = %error.code,
            "request rejected before backend call"
        );
        GatewayReply {
            status: error.http_status,
            correlation_id: ctx.correlation_id,
            response: CanonicalResponse::from_error(error),
        }
    }

    /// A GraphQL envelope was produced: HTTP 200, errors in-body.
    fn emit(
        &self,
        ctx: RequestContext,
        operation: &str,
        data: Option<Value>,
        errors: Vec<NormalizedError>,
        started: Instant,
    ) -> GatewayReply {
        for error in &errors {
            METRICS.record_error(operation, &error.code.to_string());
        }
        METRICS.record_request(
            operation,
            errors.is_empty(),
            started.elapsed().as_secs_f64(),
        );
        GatewayReply {
            status: 200,
            correlation_id: ctx.correlation_id,
            response: CanonicalResponse { data, errors },
        }
    }
}
