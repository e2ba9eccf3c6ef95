use crate::error::NormalizedError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound canonical GraphQL request envelope.
///
/// The query document is an opaque string; the gateway only ever extracts the
/// operation name and scans nesting depth, it never parses GraphQL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(
        default,
        rename = "operationName",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

impl CanonicalRequest {
    /// Variables as an object map, empty when absent. Callers must have run
    /// validation first, which rejects non-object variables.
    pub fn variable_map(&self) -> serde_json::Map<String, Value> {
        match &self.variables {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }
}

/// Outbound canonical response envelope. Both fields may be present at once
/// (partial success).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CanonicalResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<NormalizedError>,
}

impl CanonicalResponse {
    pub fn from_error(error: NormalizedError) -> Self {
        Self {
            data: None,
            errors: vec![error],
        }
    }
}

/// Monetary value. Always carries a pre-formatted display string so clients
/// never reformat currency themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
    pub formatted: String,
}

impl Money {
    /// Build from amount + currency with the fallback display format.
    /// Not locale-aware; a backend-supplied display string wins when present.
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        let currency = currency.into();
        let formatted = format!("{currency} {amount:.2}");
        Self {
            amount,
            currency,
            formatted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Money,
    /// Discounted price when the backend reports one below the regular price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
    pub in_stock: bool,
    #[serde(flatten)]
    pub kind: ProductKind,
}

/// Product-type-specific payload. Backend payload shapes vary per type, so
/// the discriminant is a tag rather than a grab-bag of optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Configurable {
        options: Vec<ConfigurableOption>,
        variants: Vec<ProductVariant>,
    },
    Bundle {
        items: Vec<ProductLink>,
    },
    Grouped {
        items: Vec<ProductLink>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurableOption {
    pub attribute_code: String,
    pub label: String,
    pub values: Vec<OptionValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    pub attributes: Vec<VariantAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantAttribute {
    pub code: String,
    pub label: String,
}

/// Child entry of a bundle or grouped product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLink {
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Category>,
}

/// Page-number pagination. No cursor scheme exists in the canonical contract;
/// the page number is the cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub items: Vec<CartItem>,
    pub items_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Money>,
    pub grand_total: Money,
    /// First applied discount; absence is null, never zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<CartDiscount>,
    /// First applied tax; absence is null, never zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Money>,
    /// Selected method of the first shipping address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_coupon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub quantity: f64,
    pub unit_price: Money,
    pub row_total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Media>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartDiscount {
    pub label: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingSelection {
    pub carrier: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub firstname: String,
    pub lastname: String,
    pub street: Vec<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub grand_total: Money,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    pub quantity: f64,
    pub row_total: Money,
}
