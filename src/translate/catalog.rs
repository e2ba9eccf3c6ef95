//! Catalog translator: products, categories, and category product listings.

use super::query::{Arg, Document, Field, fields};
use super::wire::{WireMoney, WirePageInfo};
use super::{TranslateError, Translator, opt_str, opt_u32, require_str};
use crate::backend::BackendRequest;
use crate::context::RequestContext;
use crate::model::{
    Category, ConfigurableOption, Media, Money, OptionValue, Product, ProductKind, ProductLink,
    ProductPage, ProductVariant, VariantAttribute,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

const OPERATIONS: &[&str] = &[
    "GetProduct",
    "GetProducts",
    "GetCategories",
    "GetCategory",
    "ProductsByCategory",
];

/// Canonical sort field → backend attribute. Unmapped fields pass through
/// lower-cased; the direction defaults to ASC when only a field is given.
fn map_sort(variables: &Map<String, Value>) -> Option<(String, String)> {
    let sort = variables.get("sort")?.as_object()?;
    let field = sort.get("field")?.as_str()?;
    let backend_field = match field {
        "NAME" => "name".to_string(),
        "PRICE" => "price".to_string(),
        "CREATED_AT" => "created_at".to_string(),
        "RELEVANCE" => "relevance".to_string(),
        other => other.to_lowercase(),
    };
    let direction = match sort.get("direction").and_then(Value::as_str) {
        Some("DESC") => "DESC",
        _ => "ASC",
    };
    Some((backend_field, direction.to_string()))
}

#[derive(Default)]
pub struct CatalogTranslator;

impl CatalogTranslator {
    fn product_selection() -> Field {
        Field::new("items").select([
            Field::new("id"),
            Field::new("sku"),
            Field::new("name"),
            Field::new("url_key"),
            Field::new("type_id"),
            Field::new("stock_status"),
            Field::new("description").select(fields(["html"])),
            Field::new("image").select(fields(["url", "label"])),
            Field::new("media_gallery").select(fields(["url", "label"])),
            Field::new("price_range").select([Field::new("minimum_price").select([
                Field::new("regular_price").select(fields(["value", "currency"])),
                Field::new("final_price").select(fields(["value", "currency"])),
            ])]),
            Field::new("configurable_options").select([
                Field::new("attribute_code"),
                Field::new("label"),
                Field::new("values").select(fields(["label", "value_index"])),
            ]),
            Field::new("variants").select([
                Field::new("product").select([
                    Field::new("sku"),
                    Field::new("price_range").select([Field::new("minimum_price")
                        .select([Field::new("final_price").select(fields(["value", "currency"]))])]),
                ]),
                Field::new("attributes").select(fields(["code", "label"])),
            ]),
            Field::new("items").select([
                Field::new("qty"),
                Field::new("product").select(fields(["sku", "name"])),
            ]),
        ])
    }

    fn page_selection() -> [Field; 2] {
        [
            Field::new("page_info").select(fields(["current_page", "page_size", "total_pages"])),
            Field::new("total_count"),
        ]
    }

    fn category_selection(depth: usize) -> Field {
        let mut field = Field::new("children").select(fields([
            "id",
            "name",
            "url_key",
            "level",
            "product_count",
        ]));
        for _ in 1..depth {
            field = Field::new("children")
                .select(fields(["id", "name", "url_key", "level", "product_count"]))
                .select([field]);
        }
        field
    }

    fn products_list(page: Option<u32>, size: Option<u32>, sort: Option<(String, String)>) -> Field {
        let mut list = Field::new("products")
            .arg("currentPage", Arg::Int(page.unwrap_or(1) as i64))
            .arg("pageSize", Arg::Int(size.unwrap_or(DEFAULT_PAGE_SIZE) as i64));
        if let Some((field, direction)) = sort {
            list = list.arg("sort", Arg::Object(vec![(field, Arg::Enum(direction))]));
        }
        let mut selected = vec![Self::product_selection()];
        selected.extend(Self::page_selection());
        list.select(selected)
    }
}

impl Translator for CatalogTranslator {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn operations(&self) -> &'static [&'static str] {
        OPERATIONS
    }

    fn translate(
        &self,
        operation: &str,
        variables: &Map<String, Value>,
        _ctx: &RequestContext,
    ) -> Result<BackendRequest, TranslateError> {
        match operation {
            "GetProduct" => {
                let slug = require_str(variables, "slug", "GetProduct")?;
                let doc = Document::query("ProductBySlug")
                    .variable("slug", "String")
                    .field(
                        Field::new("products")
                            .arg(
                                "filter",
                                Arg::object([(
                                    "url_key",
                                    Arg::object([("eq", Arg::var("slug"))]),
                                )]),
                            )
                            .arg("pageSize", Arg::Int(1))
                            .select([Self::product_selection()]),
                    );
                let mut bound = Map::new();
                bound.insert("slug".to_string(), json!(slug));
                Ok(doc.into_request(bound))
            }
            "GetProducts" => {
                let sort = map_sort(variables);
                let page = opt_u32(variables, "page");
                let size = opt_u32(variables, "pageSize");
                let search = opt_str(variables, "search");

                let mut list = Self::products_list(page, size, sort);
                let mut doc = Document::query("Products");
                let mut bound = Map::new();
                if let Some(search) = search {
                    doc = doc.variable("search", "String");
                    list = list.arg("search", Arg::var("search"));
                    bound.insert("search".to_string(), json!(search));
                }
                Ok(doc.field(list).into_request(bound))
            }
            "GetCategories" => {
                let doc = Document::query("Categories").field(
                    Field::new("categoryList")
                        .select(fields(["id", "name", "url_key", "level", "product_count"]))
                        .select([Self::category_selection(2)]),
                );
                Ok(doc.into_request(Map::new()))
            }
            "GetCategory" => {
                let id = require_str(variables, "id", "GetCategory")?;
                let doc = Document::query("CategoryById")
                    .variable("id", "String")
                    .field(
                        Field::new("categoryList")
                            .arg(
                                "filters",
                                Arg::object([("ids", Arg::object([("eq", Arg::var("id"))]))]),
                            )
                            .select(fields(["id", "name", "url_key", "level", "product_count"]))
                            .select([Self::category_selection(1)]),
                    );
                let mut bound = Map::new();
                bound.insert("id".to_string(), json!(id));
                Ok(doc.into_request(bound))
            }
            "ProductsByCategory" => {
                let id = require_str(variables, "categoryId", "ProductsByCategory")?;
                let sort = map_sort(variables);
                let page = opt_u32(variables, "page");
                let size = opt_u32(variables, "pageSize");

                let list = Self::products_list(page, size, sort).arg(
                    "filter",
                    Arg::object([("category_id", Arg::object([("eq", Arg::var("id"))]))]),
                );
                let doc = Document::query("CategoryProducts")
                    .variable("id", "String")
                    .field(
                        Field::new("categoryList")
                            .arg(
                                "filters",
                                Arg::object([("ids", Arg::object([("eq", Arg::var("id"))]))]),
                            )
                            .select(fields(["id"]))
                            .select([Field::new("children").select(fields(["id"]))]),
                    )
                    .field(list);
                let mut bound = Map::new();
                bound.insert("id".to_string(), json!(id));
                Ok(doc.into_request(bound))
            }
            other => Err(TranslateError::UnsupportedOperation {
                operation: other.to_string(),
            }),
        }
    }

    /// Category listings are sometimes non-anchored: the category's own
    /// `products` edge excludes child-category products. When the direct
    /// listing comes back empty and children exist, re-query across the
    /// category and its children. Strictly a fallback, never the first path.
    fn followup(
        &self,
        operation: &str,
        variables: &Map<String, Value>,
        _ctx: &RequestContext,
        first: &Value,
    ) -> Option<BackendRequest> {
        if operation != "ProductsByCategory" {
            return None;
        }
        let direct_count = first
            .get("products")
            .and_then(|p| p.get("items"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        if direct_count > 0 {
            return None;
        }
        let category = first
            .get("categoryList")
            .and_then(Value::as_array)
            .and_then(|l| l.first())?;
        let children: Vec<String> = category
            .get("children")
            .and_then(Value::as_array)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|c| c.get("id"))
                    .map(id_to_string)
                    .collect()
            })
            .unwrap_or_default();
        if children.is_empty() {
            return None;
        }

        let mut ids = vec![id_to_string(category.get("id").unwrap_or(&Value::Null))];
        ids.extend(children);
        let id_args = ids.into_iter().map(Arg::Str).collect();

        let list = Self::products_list(
            opt_u32(variables, "page"),
            opt_u32(variables, "pageSize"),
            map_sort(variables),
        )
        .arg(
            "filter",
            Arg::object([("category_id", Arg::object([("in", Arg::List(id_args))]))]),
        );
        let doc = Document::query("CategoryProductsFallback").field(list);
        Some(doc.into_request(Map::new()))
    }

    fn normalize(
        &self,
        operation: &str,
        data: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, TranslateError> {
        match operation {
            "GetProduct" => {
                let product = first_wire_product(data)
                    .map(|wire| normalize_product(wire, ctx))
                    .map(|p| serde_json::to_value(p))
                    .transpose()
                    .map_err(|e| normalize_error(operation, e))?;
                Ok(json!({ "product": product }))
            }
            "GetProducts" => {
                let page = normalize_product_page(data, ctx)
                    .map_err(|e| normalize_error(operation, e))?;
                Ok(json!({ "products": page }))
            }
            "GetCategories" => {
                let categories = wire_categories(data)
                    .into_iter()
                    .map(normalize_category)
                    .collect::<Vec<_>>();
                Ok(json!({ "categories": categories }))
            }
            "GetCategory" => {
                let category = wire_categories(data).into_iter().next().map(normalize_category);
                Ok(json!({ "category": category }))
            }
            "ProductsByCategory" => {
                let page = normalize_product_page(data, ctx)
                    .map_err(|e| normalize_error(operation, e))?;
                Ok(json!({ "productsByCategory": page }))
            }
            other => Err(TranslateError::UnsupportedOperation {
                operation: other.to_string(),
            }),
        }
    }
}

fn normalize_error(operation: &str, error: serde_json::Error) -> TranslateError {
    TranslateError::Normalize {
        operation: operation.to_string(),
        reason: error.to_string(),
    }
}

fn id_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct WireHtml {
    #[serde(default)]
    html: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMedia {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePriceSet {
    #[serde(default)]
    regular_price: Option<WireMoney>,
    #[serde(default)]
    final_price: Option<WireMoney>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePriceRange {
    #[serde(default)]
    minimum_price: Option<WirePriceSet>,
}

#[derive(Debug, Default, Deserialize)]
struct WireOptionValue {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value_index: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct WireConfigurableOption {
    #[serde(default)]
    attribute_code: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    values: Vec<WireOptionValue>,
}

#[derive(Debug, Default, Deserialize)]
struct WireVariantAttribute {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireVariantProduct {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    price_range: Option<WirePriceRange>,
}

#[derive(Debug, Default, Deserialize)]
struct WireVariant {
    #[serde(default)]
    product: Option<WireVariantProduct>,
    #[serde(default)]
    attributes: Vec<WireVariantAttribute>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLinkedProduct {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireProductLink {
    #[serde(default)]
    qty: Option<f64>,
    #[serde(default)]
    product: Option<WireLinkedProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct WireProduct {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url_key: Option<String>,
    #[serde(default)]
    type_id: Option<String>,
    #[serde(default)]
    stock_status: Option<String>,
    #[serde(default)]
    description: Option<WireHtml>,
    #[serde(default)]
    image: Option<WireMedia>,
    #[serde(default)]
    media_gallery: Vec<WireMedia>,
    #[serde(default)]
    price_range: Option<WirePriceRange>,
    #[serde(default)]
    configurable_options: Vec<WireConfigurableOption>,
    #[serde(default)]
    variants: Vec<WireVariant>,
    #[serde(default)]
    items: Vec<WireProductLink>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCategory {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url_key: Option<String>,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    product_count: Option<u64>,
    #[serde(default)]
    children: Vec<WireCategory>,
}

fn first_wire_product(data: &Value) -> Option<WireProduct> {
    let item = data
        .get("products")
        .and_then(|p| p.get("items"))
        .and_then(Value::as_array)
        .and_then(|items| items.first())?;
    serde_json::from_value(item.clone()).ok()
}

fn wire_categories(data: &Value) -> Vec<WireCategory> {
    data.get("categoryList")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|c| serde_json::from_value(c.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_product_page(data: &Value, ctx: &RequestContext) -> Result<Value, serde_json::Error> {
    let products = data.get("products");
    let items: Vec<Product> = products
        .and_then(|p| p.get("items"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<WireProduct>(item.clone()).ok())
                .map(|wire| normalize_product(wire, ctx))
                .collect()
        })
        .unwrap_or_default();

    let total_count = products
        .and_then(|p| p.get("total_count"))
        .and_then(Value::as_u64)
        .unwrap_or(items.len() as u64);
    let page_info: WirePageInfo = products
        .and_then(|p| p.get("page_info"))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    serde_json::to_value(ProductPage {
        items,
        page_info: page_info.into_page_info(total_count, DEFAULT_PAGE_SIZE),
    })
}

fn normalize_product(wire: WireProduct, ctx: &RequestContext) -> Product {
    let currency = ctx.currency.as_str();
    let minimum = wire
        .price_range
        .and_then(|range| range.minimum_price)
        .unwrap_or_default();
    let regular = minimum
        .regular_price
        .and_then(|m| m.into_money(currency));
    let final_price = minimum.final_price.and_then(|m| m.into_money(currency));
    let price = regular
        .clone()
        .or_else(|| final_price.clone())
        .unwrap_or_else(|| Money::new(0.0, currency));
    let special_price = match (&regular, final_price) {
        (Some(regular), Some(final_price)) if final_price.amount < regular.amount => {
            Some(final_price)
        }
        _ => None,
    };

    let mut media = Vec::new();
    if let Some(image) = wire.image
        && let Some(url) = image.url
    {
        media.push(Media {
            url,
            label: image.label,
        });
    }
    for entry in wire.media_gallery {
        if let Some(url) = entry.url
            && !media.iter().any(|m: &Media| m.url == url)
        {
            media.push(Media {
                url,
                label: entry.label,
            });
        }
    }

    // Variant data only applies to configurable products; other types
    // silently drop whatever the backend happened to send.
    let kind = match wire.type_id.as_deref() {
        Some("configurable") => ProductKind::Configurable {
            options: wire
                .configurable_options
                .into_iter()
                .filter_map(|option| {
                    Some(ConfigurableOption {
                        attribute_code: option.attribute_code?,
                        label: option.label.unwrap_or_default(),
                        values: option
                            .values
                            .into_iter()
                            .filter_map(|value| {
                                Some(OptionValue {
                                    label: value.label.clone()?,
                                    value: value
                                        .value_index
                                        .map(|i| i.to_string())
                                        .or(value.label)?,
                                })
                            })
                            .collect(),
                    })
                })
                .collect(),
            variants: wire
                .variants
                .into_iter()
                .filter_map(|variant| {
                    let product = variant.product?;
                    Some(ProductVariant {
                        sku: product.sku?,
                        price: product
                            .price_range
                            .and_then(|range| range.minimum_price)
                            .and_then(|min| min.final_price)
                            .and_then(|m| m.into_money(currency)),
                        attributes: variant
                            .attributes
                            .into_iter()
                            .filter_map(|attr| {
                                Some(VariantAttribute {
                                    code: attr.code?,
                                    label: attr.label.unwrap_or_default(),
                                })
                            })
                            .collect(),
                    })
                })
                .collect(),
        },
        Some("bundle") => ProductKind::Bundle {
            items: normalize_links(wire.items),
        },
        Some("grouped") => ProductKind::Grouped {
            items: normalize_links(wire.items),
        },
        _ => ProductKind::Simple,
    };

    Product {
        id: wire.id.map(|v| id_to_string(&v)).unwrap_or_default(),
        sku: wire.sku.unwrap_or_default(),
        name: wire.name.unwrap_or_default(),
        slug: wire.url_key.unwrap_or_default(),
        description: wire.description.and_then(|d| d.html),
        price,
        special_price,
        media,
        in_stock: wire.stock_status.as_deref() != Some("OUT_OF_STOCK"),
        kind,
    }
}

fn normalize_links(links: Vec<WireProductLink>) -> Vec<ProductLink> {
    links
        .into_iter()
        .filter_map(|link| {
            let product = link.product?;
            Some(ProductLink {
                sku: product.sku?,
                name: product.name,
                quantity: link.qty,
            })
        })
        .collect()
}

fn normalize_category(wire: WireCategory) -> Category {
    Category {
        id: wire.id.map(|v| id_to_string(&v)).unwrap_or_default(),
        name: wire.name.unwrap_or_default(),
        slug: wire.url_key.unwrap_or_default(),
        level: wire.level,
        product_count: wire.product_count,
        children: wire.children.into_iter().map(normalize_category).collect(),
    }
}
