use crate::backend::{GraphqlBackend, HttpBackend};
use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::registry::OperationRegistry;
use crate::translate::TranslatorRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Process-wide wiring: configuration plus the assembled gateway pipeline.
/// Everything here is read-only after construction.
pub struct AppState {
    config: Arc<GatewayConfig>,
    gateway: Gateway,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self> {
        let backend: Arc<dyn GraphqlBackend> = Arc::new(HttpBackend::new(
            &config.backend_url,
            config.backend_timeout,
        )?);
        Ok(Self::with_backend(config, backend))
    }

    /// Same wiring with a caller-supplied backend; the seam tests use.
    pub fn with_backend(config: Arc<GatewayConfig>, backend: Arc<dyn GraphqlBackend>) -> Self {
        let mut registry = OperationRegistry::with_defaults();
        registry.apply_rate_limits(&config.rate_limits);

        let cache = Some(Arc::new(ResponseCache::new(config.cache_ttls())));
        let gateway = Gateway::new(
            registry,
            TranslatorRegistry::with_defaults(),
            backend,
            cache,
            config.store_defaults(),
            config.validation_limits(),
            config.retry_policy(),
        );
        Self { config, gateway }
    }

    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.clone()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}
