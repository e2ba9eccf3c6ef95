//! Customer translator: profile and order history. All operations here are
//! auth-gated by the operation registry before translation is reached.

use super::query::{Arg, Document, Field, fields};
use super::wire::{WireMoney, WirePageInfo};
use super::{TranslateError, Translator, opt_u32, require_str};
use crate::backend::BackendRequest;
use crate::context::RequestContext;
use crate::model::{Address, Customer, Money, Order, OrderItem};
use serde::Deserialize;
use serde_json::{Map, Value, json};

const OPERATIONS: &[&str] = &["GetCustomer", "GetOrders", "GetOrder"];

const DEFAULT_ORDERS_PAGE_SIZE: u32 = 10;

pub struct CustomerTranslator;

impl CustomerTranslator {
    fn address_selection() -> Field {
        Field::new("addresses").select([
            Field::new("firstname"),
            Field::new("lastname"),
            Field::new("street"),
            Field::new("city"),
            Field::new("region").select(fields(["region"])),
            Field::new("postcode"),
            Field::new("country_code"),
            Field::new("telephone"),
        ])
    }

    fn order_selection() -> Field {
        Field::new("items").select([
            Field::new("number"),
            Field::new("status"),
            Field::new("order_date"),
            Field::new("total")
                .select([Field::new("grand_total").select(fields(["value", "currency"]))]),
            Field::new("items").select([
                Field::new("product_sku"),
                Field::new("product_name"),
                Field::new("quantity_ordered"),
                Field::new("product_sale_price").select(fields(["value", "currency"])),
            ]),
        ])
    }
}

impl Translator for CustomerTranslator {
    fn name(&self) -> &'static str {
        "customer"
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
            "GetCustomer" => {
                let doc = Document::query("Customer").field(Field::new("customer").select([
                    Field::new("firstname"),
                    Field::new("lastname"),
                    Field::new("email"),
                    Self::address_selection(),
                ]));
                Ok(doc.into_request(Map::new()))
            }
            "GetOrders" => {
                let page = opt_u32(variables, "page").unwrap_or(1);
                let size = opt_u32(variables, "pageSize").unwrap_or(DEFAULT_ORDERS_PAGE_SIZE);
                let doc = Document::query("CustomerOrders").field(
                    Field::new("customer").select([Field::new("orders")
                        .arg("currentPage", Arg::Int(page as i64))
                        .arg("pageSize", Arg::Int(size as i64))
                        .select([
                            Self::order_selection(),
                            Field::new("page_info")
                                .select(fields(["current_page", "page_size", "total_pages"])),
                            Field::new("total_count"),
                        ])]),
                );
                Ok(doc.into_request(Map::new()))
            }
            "GetOrder" => {
                let id = require_str(variables, "id", "GetOrder")?;
                let mut bound = Map::new();
                bound.insert("id".to_string(), json!(id));
                let doc = Document::query("CustomerOrder")
                    .variable("id", "String")
                    .field(
                        Field::new("customer").select([Field::new("orders")
                            .arg(
                                "filter",
                                Arg::object([("number", Arg::object([("eq", Arg::var("id"))]))]),
                            )
                            .select([Self::order_selection()])]),
                    );
                Ok(doc.into_request(bound))
            }
            other => Err(TranslateError::UnsupportedOperation {
                operation: other.to_string(),
            }),
        }
    }

    fn normalize(
        &self,
        operation: &str,
        data: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, TranslateError> {
        match operation {
            "GetCustomer" => {
                let customer = data
                    .get("customer")
                    .filter(|c| !c.is_null())
                    .and_then(|c| serde_json::from_value::<WireCustomer>(c.clone()).ok())
                    .map(normalize_customer);
                Ok(json!({ "customer": customer }))
            }
            "GetOrders" => {
                let orders = wire_orders(data);
                let items: Vec<Order> = orders
                    .items
                    .into_iter()
                    .map(|o| normalize_order(o, ctx))
                    .collect();
                let total_count = orders.total_count.unwrap_or(items.len() as u64);
                let page_info = orders
                    .page_info
                    .unwrap_or_default()
                    .into_page_info(total_count, DEFAULT_ORDERS_PAGE_SIZE);
                Ok(json!({ "orders": { "items": items, "page_info": page_info } }))
            }
            "GetOrder" => {
                let order = wire_orders(data)
                    .items
                    .into_iter()
                    .next()
                    .map(|o| normalize_order(o, ctx));
                Ok(json!({ "order": order }))
            }
            other => Err(TranslateError::UnsupportedOperation {
                operation: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct WireRegion {
    #[serde(default)]
    region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireAddress {
    #[serde(default)]
    firstname: Option<String>,
    #[serde(default)]
    lastname: Option<String>,
    #[serde(default)]
    street: Vec<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<WireRegion>,
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    telephone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCustomer {
    #[serde(default)]
    firstname: Option<String>,
    #[serde(default)]
    lastname: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    addresses: Vec<WireAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct WireOrderTotal {
    #[serde(default)]
    grand_total: Option<WireMoney>,
}

#[derive(Debug, Default, Deserialize)]
struct WireOrderItem {
    #[serde(default)]
    product_sku: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    quantity_ordered: Option<f64>,
    #[serde(default)]
    product_sale_price: Option<WireMoney>,
}

#[derive(Debug, Default, Deserialize)]
struct WireOrder {
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    order_date: Option<String>,
    #[serde(default)]
    total: Option<WireOrderTotal>,
    #[serde(default)]
    items: Vec<WireOrderItem>,
}

#[derive(Debug, Default, Deserialize)]
struct WireOrders {
    #[serde(default)]
    items: Vec<WireOrder>,
    #[serde(default)]
    page_info: Option<WirePageInfo>,
    #[serde(default)]
    total_count: Option<u64>,
}

fn wire_orders(data: &Value) -> WireOrders {
    data.get("customer")
        .and_then(|c| c.get("orders"))
        .and_then(|o| serde_json::from_value(o.clone()).ok())
        .unwrap_or_default()
}

fn normalize_customer(wire: WireCustomer) -> Customer {
    Customer {
        firstname: wire.firstname.unwrap_or_default(),
        lastname: wire.lastname.unwrap_or_default(),
        email: wire.email.unwrap_or_default(),
        addresses: wire
            .addresses
            .into_iter()
            .map(|a| Address {
                firstname: a.firstname.unwrap_or_default(),
                lastname: a.lastname.unwrap_or_default(),
                street: a.street,
                city: a.city.unwrap_or_default(),
                region: a.region.and_then(|r| r.region),
                postcode: a.postcode,
                country_code: a.country_code.unwrap_or_default(),
                telephone: a.telephone,
            })
            .collect(),
    }
}

fn normalize_order(wire: WireOrder, ctx: &RequestContext) -> Order {
    let currency = ctx.currency.as_str();
    Order {
        id: wire.number.unwrap_or_default(),
        status: wire.status.unwrap_or_default(),
        created_at: wire.order_date,
        grand_total: wire
            .total
            .and_then(|t| t.grand_total)
            .and_then(|m| m.into_money(currency))
            .unwrap_or_else(|| Money::new(0.0, currency)),
        items: wire
            .items
            .into_iter()
            .filter_map(|item| {
                let quantity = item.quantity_ordered.unwrap_or(0.0);
                let unit = item
                    .product_sale_price
                    .and_then(|m| m.into_money(ctx.currency.as_str()))?;
                Some(OrderItem {
                    sku: item.product_sku?,
                    name: item.product_name.unwrap_or_default(),
                    quantity,
                    row_total: Money::new(unit.amount * quantity, unit.currency),
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StoreDefaults;
    use std::collections::HashMap;

    fn ctx() -> RequestContext {
        RequestContext::from_transport(&HashMap::new(), &HashMap::new(), &StoreDefaults::default())
    }

    #[test]
    fn orders_query_paginates() {
        let translator = CustomerTranslator;
        let request = translator
            .translate("GetOrders", &Map::new(), &ctx())
            .unwrap();
        assert!(request.query.contains("currentPage: 1"));
        assert!(request.query.contains("pageSize: 10"));
    }

    #[test]
    fn normalizes_customer_with_addresses() {
        let translator = CustomerTranslator;
        let data = json!({"customer": {
            "firstname": "Ada", "lastname": "L", "email": "ada@example.test",
            "addresses": [{"firstname": "Ada", "lastname": "L",
                "street": ["1 Main St"], "city": "Springfield",
                "region": {"region": "IL"}, "postcode": "62704",
                "country_code": "US", "telephone": "555"}]
        }});
        let normalized = translator.normalize("GetCustomer", &data, &ctx()).unwrap();
        assert_eq!(normalized["customer"]["email"], "ada@example.test");
        assert_eq!(normalized["customer"]["addresses"][0]["region"], "IL");
    }

    #[test]
    fn null_customer_stays_null() {
        let translator = CustomerTranslator;
        let normalized = translator
            .normalize("GetCustomer", &json!({"customer": null}), &ctx())
            .unwrap();
        assert!(normalized["customer"].is_null());
    }

    #[test]
    fn order_row_totals_multiply_quantity() {
        let translator = CustomerTranslator;
        let data = json!({"customer": {"orders": {
            "items": [{"number": "001", "status": "complete",
                "order_date": "2026-01-02",
                "total": {"grand_total": {"value": 60.0, "currency": "USD"}},
                "items": [{"product_sku": "A", "product_name": "A",
                    "quantity_ordered": 3.0,
                    "product_sale_price": {"value": 20.0, "currency": "USD"}}]}],
            "total_count": 1
        }}});
        let normalized = translator.normalize("GetOrders", &data, &ctx()).unwrap();
        let order = &normalized["orders"]["items"][0];
        assert_eq!(order["id"], "001");
        assert_eq!(order["items"][0]["row_total"]["amount"], 60.0);
    }
}
