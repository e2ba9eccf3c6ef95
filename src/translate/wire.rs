//! Shared backend wire shapes used by every translator's `normalize`.
//!
//! All fields are optional with defaults: a partially-populated backend
//! payload deserializes cleanly and surfaces as canonical nulls or empty
//! collections, never as an error.

use crate::error::{NormalizedError, normalize_backend_user_error};
use crate::model::{Money, PageInfo};
use serde::Deserialize;
use serde_json::Value;

/// Backend money object `{value, currency}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireMoney {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl WireMoney {
    /// Canonical money, or None when the backend sent no amount. The
    /// context currency fills in when the backend omits one.
    pub fn into_money(self, fallback_currency: &str) -> Option<Money> {
        let amount = self.value?;
        let currency = self
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| fallback_currency.to_string());
        Some(Money::new(amount, currency))
    }
}

/// Backend page info `{current_page, page_size, total_pages}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirePageInfo {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl WirePageInfo {
    /// Canonical page info; `has_next_page` is current_page < total_pages.
    pub fn into_page_info(self, total_count: u64, default_page_size: u32) -> PageInfo {
        let current_page = self.current_page.unwrap_or(1);
        let total_pages = self.total_pages.unwrap_or(if total_count > 0 { 1 } else { 0 });
        PageInfo {
            current_page,
            page_size: self.page_size.unwrap_or(default_page_size),
            total_pages,
            total_count,
            has_next_page: current_page < total_pages,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUserError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Collect `user_errors` arrays returned alongside otherwise-successful
/// mutation data. The backend nests them one level down, next to the `cart`
/// or `order` field of each mutation result.
pub fn collect_user_errors(data: &Value) -> Vec<NormalizedError> {
    let Some(root) = data.as_object() else {
        return Vec::new();
    };
    let mut collected = Vec::new();
    for result in root.values() {
        let Some(entries) = result.get("user_errors").and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let wire: WireUserError =
                serde_json::from_value(entry.clone()).unwrap_or_default();
            let message = wire
                .message
                .or(wire.code)
                .unwrap_or_else(|| "unspecified error".to_string());
            collected.push(normalize_backend_user_error(&message));
        }
    }
    collected
}
