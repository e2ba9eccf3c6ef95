use crate::backend::RetryPolicy;
use crate::cache::CacheTtls;
use crate::context::StoreDefaults;
use crate::validation::ValidationLimits;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_STORE_CODE: &str = "default";
const DEFAULT_LOCALE: &str = "en_US";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
const DEFAULT_MAX_QUERY_DEPTH: usize = 10;
const DEFAULT_PRODUCT_TTL_SECS: u64 = 60;
const DEFAULT_CATEGORY_TTL_SECS: u64 = 300;
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";

/// Resolved gateway configuration: CLI beats file beats default.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub backend_url: String,
    pub store_code: String,
    pub locale: String,
    pub currency: String,
    pub backend_timeout: Duration,
    pub retry_max_attempts: u32,
    pub max_payload_bytes: usize,
    pub max_query_depth: usize,
    pub product_cache_ttl: Duration,
    pub category_cache_ttl: Duration,
    pub rate_limits: HashMap<String, u32>,
    pub http_bind_address: SocketAddr,
}

impl GatewayConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            backend_url: cli_backend_url,
            store_code: cli_store_code,
            locale: cli_locale,
            currency: cli_currency,
            backend_timeout_secs: cli_timeout,
            retry_max_attempts: cli_attempts,
            max_payload_bytes: cli_payload,
            max_query_depth: cli_depth,
            product_cache_ttl_secs: cli_product_ttl,
            category_cache_ttl_secs: cli_category_ttl,
            rate_limit: cli_rate_limits,
            http_bind: cli_http_bind,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let backend_url = cli_backend_url
            .or(file_config.backend_url)
            .context("backend URL must be provided via --backend-url, config file, or env")?;

        let rate_limits = cli_rate_limits
            .map(|pairs| parse_rate_limits(&pairs))
            .transpose()?
            .or(file_config.rate_limits)
            .unwrap_or_default();

        let resolved = Self {
            backend_url,
            store_code: cli_store_code
                .or(file_config.store_code)
                .unwrap_or_else(|| DEFAULT_STORE_CODE.to_string()),
            locale: cli_locale
                .or(file_config.locale)
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            currency: cli_currency
                .or(file_config.currency)
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            backend_timeout: Duration::from_secs(
                cli_timeout
                    .or(file_config.backend_timeout_secs)
                    .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS)
                    .max(1),
            ),
            retry_max_attempts: cli_attempts
                .or(file_config.retry_max_attempts)
                .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS)
                .max(1),
            max_payload_bytes: cli_payload
                .or(file_config.max_payload_bytes)
                .unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES)
                .max(1024),
            max_query_depth: cli_depth
                .or(file_config.max_query_depth)
                .unwrap_or(DEFAULT_MAX_QUERY_DEPTH)
                .max(1),
            product_cache_ttl: Duration::from_secs(
                cli_product_ttl
                    .or(file_config.product_cache_ttl_secs)
                    .unwrap_or(DEFAULT_PRODUCT_TTL_SECS),
            ),
            category_cache_ttl: Duration::from_secs(
                cli_category_ttl
                    .or(file_config.category_cache_ttl_secs)
                    .unwrap_or(DEFAULT_CATEGORY_TTL_SECS),
            ),
            rate_limits,
            http_bind_address: cli_http_bind.or(file_config.http_bind).unwrap_or_else(|| {
                DEFAULT_HTTP_BIND.parse().expect("default bind address valid")
            }),
        };
        resolved.validate()?;
        Ok(resolved)
    }

    /// Fail-fast sanity checks before server startup.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.backend_url)
            .with_context(|| format!("backend URL {:?} is not a valid URL", self.backend_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "backend URL {:?} must be http or https",
            self.backend_url
        );
        anyhow::ensure!(
            !self.currency.trim().is_empty(),
            "default currency must not be empty"
        );
        Ok(())
    }

    pub fn store_defaults(&self) -> StoreDefaults {
        StoreDefaults {
            store_code: self.store_code.clone(),
            locale: self.locale.clone(),
            currency: self.currency.clone(),
        }
    }

    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_payload_bytes: self.max_payload_bytes,
            max_query_depth: self.max_query_depth,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            ..Default::default()
        }
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            product: self.product_cache_ttl,
            category: self.category_cache_ttl,
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "storefront-gateway",
    about = "Canonical GraphQL gateway fronting a commerce backend",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_BACKEND_URL",
        value_name = "URL",
        help = "Backend commerce GraphQL endpoint"
    )]
    pub backend_url: Option<String>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_STORE_CODE",
        value_name = "CODE",
        help = "Default store code when the request sends none"
    )]
    pub store_code: Option<String>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_LOCALE",
        value_name = "LOCALE",
        help = "Default locale when the request sends none"
    )]
    pub locale: Option<String>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_CURRENCY",
        value_name = "CUR",
        help = "Default currency when the request sends none"
    )]
    pub currency: Option<String>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_BACKEND_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Per-call backend timeout in seconds"
    )]
    pub backend_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_RETRY_MAX_ATTEMPTS",
        value_name = "N",
        help = "Maximum backend attempts for retryable failures"
    )]
    pub retry_max_attempts: Option<u32>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_MAX_PAYLOAD_BYTES",
        value_name = "BYTES",
        help = "Maximum serialized request payload size"
    )]
    pub max_payload_bytes: Option<usize>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_MAX_QUERY_DEPTH",
        value_name = "N",
        help = "Maximum structural query nesting depth"
    )]
    pub max_query_depth: Option<usize>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_PRODUCT_CACHE_TTL_SECS",
        value_name = "SECS",
        help = "Response cache TTL for product queries (0 disables)"
    )]
    pub product_cache_ttl_secs: Option<u64>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_CATEGORY_CACHE_TTL_SECS",
        value_name = "SECS",
        help = "Response cache TTL for category queries (0 disables)"
    )]
    pub category_cache_ttl_secs: Option<u64>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_RATE_LIMIT",
        value_name = "OP=N",
        value_delimiter = ',',
        help = "Per-operation rate-limit hints, e.g. PlaceOrder=10,AddToCart=60"
    )]
    pub rate_limit: Option<Vec<String>>,

    #[arg(
        long,
        env = "STOREFRONT_GATEWAY_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address for the gateway"
    )]
    pub http_bind: Option<SocketAddr>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    backend_url: Option<String>,
    store_code: Option<String>,
    locale: Option<String>,
    currency: Option<String>,
    backend_timeout_secs: Option<u64>,
    retry_max_attempts: Option<u32>,
    max_payload_bytes: Option<usize>,
    max_query_depth: Option<usize>,
    product_cache_ttl_secs: Option<u64>,
    category_cache_ttl_secs: Option<u64>,
    rate_limits: Option<HashMap<String, u32>>,
    http_bind: Option<SocketAddr>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

fn parse_rate_limits(pairs: &[String]) -> Result<HashMap<String, u32>> {
    let mut limits = HashMap::new();
    for pair in pairs {
        let (operation, limit) = pair
            .split_once('=')
            .with_context(|| format!("rate limit {pair:?} must look like Operation=N"))?;
        let limit: u32 = limit
            .trim()
            .parse()
            .with_context(|| format!("rate limit {pair:?} has a non-numeric bound"))?;
        limits.insert(operation.trim().to_string(), limit);
    }
    Ok(limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rate_limit_pairs() {
        let limits =
            parse_rate_limits(&["PlaceOrder=10".to_string(), "AddToCart = 60".to_string()])
                .unwrap();
        assert_eq!(limits["PlaceOrder"], 10);
        assert_eq!(limits["AddToCart"], 60);
        assert!(parse_rate_limits(&["bogus".to_string()]).is_err());
        assert!(parse_rate_limits(&["Op=ten".to_string()]).is_err());
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let args = CliArgs {
            backend_url: Some("ftp://example.test/graphql".to_string()),
            ..Default::default()
        };
        assert!(GatewayConfig::from_args(args).is_err());
    }

    #[test]
    fn missing_backend_url_is_an_error() {
        assert!(GatewayConfig::from_args(CliArgs::default()).is_err());
    }

    #[test]
    fn defaults_apply() {
        let args = CliArgs {
            backend_url: Some("https://backend.example/graphql".to_string()),
            ..Default::default()
        };
        let config = GatewayConfig::from_args(args).unwrap();
        assert_eq!(config.store_code, "default");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.backend_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.max_payload_bytes, 1024 * 1024);
        assert_eq!(config.max_query_depth, 10);
    }
}
