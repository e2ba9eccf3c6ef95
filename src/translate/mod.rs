//! Translators: canonical operation → backend document, backend payload →
//! canonical data.
//!
//! Each translator owns one domain area and is registered per operation name;
//! the registry is the enforcement point that keeps a name from ever reaching
//! the wrong translator.

pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod query;
pub mod wire;

use crate::backend::BackendRequest;
use crate::context::RequestContext;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// Routed a name this translator does not recognize: a programmer error,
    /// the translator registry should have prevented it.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("operation {operation} requires variable `{variable}`")]
    MissingVariable {
        operation: &'static str,
        variable: &'static str,
    },

    #[error("failed to normalize {operation} payload: {reason}")]
    Normalize { operation: String, reason: String },
}

/// Common contract for all domain translators. Both methods are pure.
pub trait Translator: Send + Sync {
    /// Translator name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Canonical operation names this translator handles.
    fn operations(&self) -> &'static [&'static str];

    /// Rewrite a canonical operation into a backend document.
    fn translate(
        &self,
        operation: &str,
        variables: &Map<String, Value>,
        ctx: &RequestContext,
    ) -> Result<BackendRequest, TranslateError>;

    /// Convert a backend `data` payload into canonical data. Must tolerate
    /// partially-populated payloads: missing optional fields become canonical
    /// null/empty, never an error.
    fn normalize(
        &self,
        operation: &str,
        data: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, TranslateError>;

    /// Optional compensating follow-up once the first backend payload is in
    /// hand; when returned, the orchestrator executes it and prefers its
    /// payload. Used by the catalog translator's category fallback.
    fn followup(
        &self,
        _operation: &str,
        _variables: &Map<String, Value>,
        _ctx: &RequestContext,
        _first: &Value,
    ) -> Option<BackendRequest> {
        None
    }
}

/// Required string variable, or the canonical missing-variable error.
pub(crate) fn require_str<'a>(
    variables: &'a Map<String, Value>,
    key: &'static str,
    operation: &'static str,
) -> Result<&'a str, TranslateError> {
    variables
        .get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(TranslateError::MissingVariable {
            operation,
            variable: key,
        })
}

pub(crate) fn opt_str<'a>(variables: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    variables
        .get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}

pub(crate) fn opt_u32(variables: &Map<String, Value>, key: &str) -> Option<u32> {
    variables
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v.min(u32::MAX as u64) as u32)
}

/// Operation name → translator instance.
pub struct TranslatorRegistry {
    by_operation: HashMap<&'static str, Arc<dyn Translator>>,
}

impl TranslatorRegistry {
    pub fn empty() -> Self {
        Self {
            by_operation: HashMap::new(),
        }
    }

    /// The full translator set for the canonical contract.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(catalog::CatalogTranslator::default()));
        registry.register(Arc::new(checkout::CheckoutTranslator));
        registry.register(Arc::new(customer::CustomerTranslator));
        registry
    }

    pub fn register(&mut self, translator: Arc<dyn Translator>) {
        for &operation in translator.operations() {
            self.by_operation.insert(operation, translator.clone());
        }
    }

    pub fn lookup(&self, operation: &str) -> Option<Arc<dyn Translator>> {
        self.by_operation.get(operation).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OperationRegistry;

    #[test]
    fn every_registered_operation_has_a_translator() {
        let operations = OperationRegistry::with_defaults();
        let translators = TranslatorRegistry::with_defaults();
        for name in operations.all_names() {
            assert!(
                translators.lookup(name).is_some(),
                "no translator registered for {name}"
            );
        }
    }

    #[test]
    fn lookup_misses_unknown_names() {
        let translators = TranslatorRegistry::with_defaults();
        assert!(translators.lookup("NoSuchOperation").is_none());
    }
}
