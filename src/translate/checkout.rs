//! Cart and checkout translator.
//!
//! Every cart-scoped operation takes its cart id from context. A missing id
//! is not rejected here; the backend's own missing-cart error comes back and
//! is normalized like any other.

use super::query::{Arg, Document, Field, fields};
use super::wire::WireMoney;
use super::{TranslateError, Translator, opt_str, require_str};
use crate::backend::BackendRequest;
use crate::context::RequestContext;
use crate::model::{Cart, CartDiscount, CartItem, Media, Money, ShippingSelection};
use serde::Deserialize;
use serde_json::{Map, Value, json};

const OPERATIONS: &[&str] = &[
    "GetCart",
    "AddToCart",
    "UpdateCartItem",
    "RemoveCartItem",
    "ApplyCoupon",
    "RemoveCoupon",
    "SetShippingAddress",
    "SetShippingMethod",
    "SetPaymentMethod",
    "PlaceOrder",
    "MergeCarts",
];

pub struct CheckoutTranslator;

impl CheckoutTranslator {
    fn cart_selection() -> Vec<Field> {
        vec![
            Field::new("id"),
            Field::new("total_quantity"),
            Field::new("applied_coupons").select(fields(["code"])),
            Field::new("prices").select([
                Field::new("subtotal_excluding_tax").select(fields(["value", "currency"])),
                Field::new("grand_total").select(fields(["value", "currency"])),
                Field::new("discounts").select([
                    Field::new("label"),
                    Field::new("amount").select(fields(["value", "currency"])),
                ]),
                Field::new("applied_taxes").select([
                    Field::new("label"),
                    Field::new("amount").select(fields(["value", "currency"])),
                ]),
            ]),
            Field::new("items").select([
                Field::new("uid"),
                Field::new("quantity"),
                Field::new("product").select([
                    Field::new("sku"),
                    Field::new("name"),
                    Field::new("thumbnail").select(fields(["url", "label"])),
                ]),
                Field::new("prices").select([
                    Field::new("price").select(fields(["value", "currency"])),
                    Field::new("row_total").select(fields(["value", "currency"])),
                ]),
            ]),
            Field::new("shipping_addresses").select([Field::new("selected_shipping_method")
                .select([
                    Field::new("carrier_code"),
                    Field::new("carrier_title"),
                    Field::new("method_code"),
                    Field::new("method_title"),
                    Field::new("amount").select(fields(["value", "currency"])),
                ])]),
        ]
    }

    fn cart_result() -> Field {
        Field::new("cart").select(Self::cart_selection())
    }

    /// Cart id for the operation; absence flows through as an empty id and
    /// surfaces as the backend's missing-cart error.
    fn bound_cart_id(ctx: &RequestContext) -> Value {
        json!(ctx.cart_token.clone().unwrap_or_default())
    }
}

impl Translator for CheckoutTranslator {
    fn name(&self) -> &'static str {
        "checkout"
    }

    fn operations(&self) -> &'static [&'static str] {
        OPERATIONS
    }

    fn translate(
        &self,
        operation: &str,
        variables: &Map<String, Value>,
        ctx: &RequestContext,
    ) -> Result<BackendRequest, TranslateError> {
        let mut bound = Map::new();

        // Logged-in customers without a cart token read their backend-resolved
        // account cart; everything else addresses the cart by id.
        if operation == "GetCart" {
            if ctx.cart_token.is_none() && ctx.has_customer_token() {
                let doc = Document::query("CustomerCart")
                    .field(Field::new("customerCart").select(Self::cart_selection()));
                return Ok(doc.into_request(bound));
            }
            bound.insert("cartId".to_string(), Self::bound_cart_id(ctx));
            let doc = Document::query("Cart").variable("cartId", "String!").field(
                Field::new("cart")
                    .arg("cart_id", Arg::var("cartId"))
                    .select(Self::cart_selection()),
            );
            return Ok(doc.into_request(bound));
        }

        bound.insert("cartId".to_string(), Self::bound_cart_id(ctx));
        match operation {
            "AddToCart" => {
                let sku = require_str(variables, "sku", "AddToCart")?;
                let quantity = variables
                    .get("quantity")
                    .and_then(Value::as_f64)
                    .unwrap_or(1.0);
                bound.insert("sku".to_string(), json!(sku));
                bound.insert("quantity".to_string(), json!(quantity));
                let doc = Document::mutation("AddProductsToCart")
                    .variable("cartId", "String!")
                    .variable("sku", "String!")
                    .variable("quantity", "Float!")
                    .field(
                        Field::new("addProductsToCart")
                            .arg("cartId", Arg::var("cartId"))
                            .arg(
                                "cartItems",
                                Arg::List(vec![Arg::object([
                                    ("sku", Arg::var("sku")),
                                    ("quantity", Arg::var("quantity")),
                                ])]),
                            )
                            .select([
                                Self::cart_result(),
                                Field::new("user_errors").select(fields(["code", "message"])),
                            ]),
                    );
                Ok(doc.into_request(bound))
            }
            "UpdateCartItem" => {
                let item_id = require_str(variables, "itemId", "UpdateCartItem")?;
                let quantity = variables
                    .get("quantity")
                    .and_then(Value::as_f64)
                    .unwrap_or(1.0);
                bound.insert("itemId".to_string(), json!(item_id));
                bound.insert("quantity".to_string(), json!(quantity));
                let doc = Document::mutation("UpdateCartItems")
                    .variable("cartId", "String!")
                    .variable("itemId", "ID!")
                    .variable("quantity", "Float!")
                    .field(
                        Field::new("updateCartItems")
                            .arg(
                                "input",
                                Arg::object([
                                    ("cart_id", Arg::var("cartId")),
                                    (
                                        "cart_items",
                                        Arg::List(vec![Arg::object([
                                            ("cart_item_uid", Arg::var("itemId")),
                                            ("quantity", Arg::var("quantity")),
                                        ])]),
                                    ),
                                ]),
                            )
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "RemoveCartItem" => {
                let item_id = require_str(variables, "itemId", "RemoveCartItem")?;
                bound.insert("itemId".to_string(), json!(item_id));
                let doc = Document::mutation("RemoveItemFromCart")
                    .variable("cartId", "String!")
                    .variable("itemId", "ID!")
                    .field(
                        Field::new("removeItemFromCart")
                            .arg(
                                "input",
                                Arg::object([
                                    ("cart_id", Arg::var("cartId")),
                                    ("cart_item_uid", Arg::var("itemId")),
                                ]),
                            )
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "ApplyCoupon" => {
                let code = require_str(variables, "code", "ApplyCoupon")?;
                bound.insert("code".to_string(), json!(code));
                let doc = Document::mutation("ApplyCouponToCart")
                    .variable("cartId", "String!")
                    .variable("code", "String!")
                    .field(
                        Field::new("applyCouponToCart")
                            .arg(
                                "input",
                                Arg::object([
                                    ("cart_id", Arg::var("cartId")),
                                    ("coupon_code", Arg::var("code")),
                                ]),
                            )
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "RemoveCoupon" => {
                let doc = Document::mutation("RemoveCouponFromCart")
                    .variable("cartId", "String!")
                    .field(
                        Field::new("removeCouponFromCart")
                            .arg("input", Arg::object([("cart_id", Arg::var("cartId"))]))
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "SetShippingAddress" => {
                let address = variables.get("address").cloned().ok_or(
                    TranslateError::MissingVariable {
                        operation: "SetShippingAddress",
                        variable: "address",
                    },
                )?;
                bound.insert("address".to_string(), address);
                let doc = Document::mutation("SetShippingAddressesOnCart")
                    .variable("cartId", "String!")
                    .variable("address", "CartAddressInput!")
                    .field(
                        Field::new("setShippingAddressesOnCart")
                            .arg(
                                "input",
                                Arg::object([
                                    ("cart_id", Arg::var("cartId")),
                                    (
                                        "shipping_addresses",
                                        Arg::List(vec![Arg::object([(
                                            "address",
                                            Arg::var("address"),
                                        )])]),
                                    ),
                                ]),
                            )
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "SetShippingMethod" => {
                let carrier = require_str(variables, "carrierCode", "SetShippingMethod")?;
                let method = require_str(variables, "methodCode", "SetShippingMethod")?;
                bound.insert("carrier".to_string(), json!(carrier));
                bound.insert("method".to_string(), json!(method));
                let doc = Document::mutation("SetShippingMethodsOnCart")
                    .variable("cartId", "String!")
                    .variable("carrier", "String!")
                    .variable("method", "String!")
                    .field(
                        Field::new("setShippingMethodsOnCart")
                            .arg(
                                "input",
                                Arg::object([
                                    ("cart_id", Arg::var("cartId")),
                                    (
                                        "shipping_methods",
                                        Arg::List(vec![Arg::object([
                                            ("carrier_code", Arg::var("carrier")),
                                            ("method_code", Arg::var("method")),
                                        ])]),
                                    ),
                                ]),
                            )
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "SetPaymentMethod" => {
                let method = require_str(variables, "methodCode", "SetPaymentMethod")?;
                bound.insert("method".to_string(), json!(method));
                let doc = Document::mutation("SetPaymentMethodOnCart")
                    .variable("cartId", "String!")
                    .variable("method", "String!")
                    .field(
                        Field::new("setPaymentMethodOnCart")
                            .arg(
                                "input",
                                Arg::object([
                                    ("cart_id", Arg::var("cartId")),
                                    (
                                        "payment_method",
                                        Arg::object([("code", Arg::var("method"))]),
                                    ),
                                ]),
                            )
                            .select([Self::cart_result()]),
                    );
                Ok(doc.into_request(bound))
            }
            "PlaceOrder" => {
                let doc = Document::mutation("PlaceOrder")
                    .variable("cartId", "String!")
                    .field(
                        Field::new("placeOrder")
                            .arg("input", Arg::object([("cart_id", Arg::var("cartId"))]))
                            .select([Field::new("order").select(fields(["order_number"]))]),
                    );
                Ok(doc.into_request(bound))
            }
            "MergeCarts" => {
                // source: guest cart being folded in; destination optional,
                // the backend defaults it to the customer's own cart.
                let source = opt_str(variables, "sourceCartId")
                    .map(str::to_string)
                    .or_else(|| ctx.cart_token.clone())
                    .ok_or(TranslateError::MissingVariable {
                        operation: "MergeCarts",
                        variable: "sourceCartId",
                    })?;
                bound.clear();
                bound.insert("source".to_string(), json!(source));
                let mut merge = Field::new("mergeCarts").arg("source_cart_id", Arg::var("source"));
                let mut doc = Document::mutation("MergeCarts").variable("source", "String!");
                if let Some(destination) = opt_str(variables, "destinationCartId") {
                    bound.insert("destination".to_string(), json!(destination));
                    doc = doc.variable("destination", "String");
                    merge = merge.arg("destination_cart_id", Arg::var("destination"));
                }
                Ok(doc.field(merge.select(Self::cart_selection())).into_request(bound))
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
            "PlaceOrder" => {
                let order_number = data
                    .get("placeOrder")
                    .and_then(|r| r.get("order"))
                    .and_then(|o| o.get("order_number"))
                    .and_then(Value::as_str);
                Ok(json!({ "order": order_number.map(|id| json!({ "id": id })) }))
            }
            op if OPERATIONS.contains(&op) => {
                let cart = extract_cart(data)
                    .map(|wire| normalize_cart(wire, ctx))
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(|e| TranslateError::Normalize {
                        operation: op.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(json!({ "cart": cart }))
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
struct WireCoupon {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLabeledMoney {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    amount: Option<WireMoney>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCartPrices {
    #[serde(default)]
    subtotal_excluding_tax: Option<WireMoney>,
    #[serde(default)]
    grand_total: Option<WireMoney>,
    #[serde(default)]
    discounts: Option<Vec<WireLabeledMoney>>,
    #[serde(default)]
    applied_taxes: Option<Vec<WireLabeledMoney>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCartItemProduct {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    thumbnail: Option<WireThumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct WireThumbnail {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCartItemPrices {
    #[serde(default)]
    price: Option<WireMoney>,
    #[serde(default)]
    row_total: Option<WireMoney>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCartItem {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    product: Option<WireCartItemProduct>,
    #[serde(default)]
    prices: Option<WireCartItemPrices>,
}

#[derive(Debug, Default, Deserialize)]
struct WireShippingMethod {
    #[serde(default)]
    carrier_code: Option<String>,
    #[serde(default)]
    carrier_title: Option<String>,
    #[serde(default)]
    method_code: Option<String>,
    #[serde(default)]
    method_title: Option<String>,
    #[serde(default)]
    amount: Option<WireMoney>,
}

#[derive(Debug, Default, Deserialize)]
struct WireShippingAddress {
    #[serde(default)]
    selected_shipping_method: Option<WireShippingMethod>,
}

#[derive(Debug, Default, Deserialize)]
struct WireCart {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    total_quantity: Option<f64>,
    #[serde(default)]
    applied_coupons: Option<Vec<WireCoupon>>,
    #[serde(default)]
    prices: Option<WireCartPrices>,
    #[serde(default)]
    items: Option<Vec<WireCartItem>>,
    #[serde(default)]
    shipping_addresses: Option<Vec<WireShippingAddress>>,
}

/// Find the cart object wherever the backend put it: top-level `cart` or
/// `customerCart`, the `cart` field of a mutation result, or a mutation
/// result that is itself a cart (`mergeCarts`).
fn extract_cart(data: &Value) -> Option<WireCart> {
    let root = data.as_object()?;
    let candidate = root
        .get("cart")
        .or_else(|| root.get("customerCart"))
        .or_else(|| {
            root.values().find_map(|result| {
                result.get("cart").or_else(|| {
                    (result.get("id").is_some() && result.get("items").is_some())
                        .then_some(result)
                })
            })
        })?;
    if candidate.is_null() {
        return None;
    }
    serde_json::from_value(candidate.clone()).ok()
}

fn normalize_cart(wire: WireCart, ctx: &RequestContext) -> Cart {
    let currency = ctx.currency.as_str();
    let prices = wire.prices.unwrap_or_default();

    // Single-value projections: first discount, first applied tax, first
    // shipping address's selected method. Absence is null, never zero.
    let discount = prices
        .discounts
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|d| {
            Some(CartDiscount {
                label: d.label.unwrap_or_else(|| "Discount".to_string()),
                amount: d.amount?.into_money(currency)?,
            })
        });
    let tax = prices
        .applied_taxes
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|t| t.amount)
        .and_then(|m| m.into_money(currency));
    let shipping = wire
        .shipping_addresses
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|a| a.selected_shipping_method)
        .and_then(|m| {
            Some(ShippingSelection {
                carrier: m.carrier_title.or(m.carrier_code)?,
                method: m.method_title.or(m.method_code).unwrap_or_default(),
                amount: m.amount.and_then(|a| a.into_money(currency)),
            })
        });

    let items: Vec<CartItem> = wire
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| {
            let product = item.product.unwrap_or_default();
            let item_prices = item.prices.unwrap_or_default();
            Some(CartItem {
                id: item.uid?,
                sku: product.sku.unwrap_or_default(),
                name: product.name.unwrap_or_default(),
                quantity: item.quantity.unwrap_or(0.0),
                unit_price: item_prices
                    .price
                    .and_then(|m| m.into_money(currency))
                    .unwrap_or_else(|| Money::new(0.0, currency)),
                row_total: item_prices
                    .row_total
                    .and_then(|m| m.into_money(currency))
                    .unwrap_or_else(|| Money::new(0.0, currency)),
                image: product.thumbnail.and_then(|t| {
                    Some(Media {
                        url: t.url?,
                        label: t.label,
                    })
                }),
            })
        })
        .collect();

    Cart {
        id: wire.id.unwrap_or_default(),
        items_count: wire.total_quantity.unwrap_or(0.0).round() as u32,
        subtotal: prices
            .subtotal_excluding_tax
            .and_then(|m| m.into_money(currency)),
        grand_total: prices
            .grand_total
            .and_then(|m| m.into_money(currency))
            .unwrap_or_else(|| Money::new(0.0, currency)),
        discount,
        tax,
        shipping,
        applied_coupon: wire
            .applied_coupons
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.code),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StoreDefaults;
    use std::collections::HashMap;

    fn ctx_with(cart: Option<&str>, customer: Option<&str>) -> RequestContext {
        let mut ctx = RequestContext::from_transport(
            &HashMap::new(),
            &HashMap::new(),
            &StoreDefaults::default(),
        );
        ctx.cart_token = cart.map(str::to_string);
        ctx.customer_token = customer.map(str::to_string);
        ctx
    }

    fn vars(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn get_cart_uses_customer_cart_without_token() {
        let translator = CheckoutTranslator;
        let request = translator
            .translate("GetCart", &Map::new(), &ctx_with(None, Some("tok")))
            .unwrap();
        assert!(request.query.contains("customerCart"));
        assert!(request.variables.is_empty());
    }

    #[test]
    fn get_cart_addresses_cart_by_id() {
        let translator = CheckoutTranslator;
        let request = translator
            .translate("GetCart", &Map::new(), &ctx_with(Some("c-9"), None))
            .unwrap();
        assert!(request.query.contains("cart(cart_id: $cartId)"));
        assert_eq!(request.variables["cartId"], json!("c-9"));
    }

    #[test]
    fn missing_cart_token_is_not_rejected_up_front() {
        let translator = CheckoutTranslator;
        let request = translator
            .translate("PlaceOrder", &Map::new(), &ctx_with(None, None))
            .unwrap();
        // empty id flows through; the backend's missing-cart error is the answer
        assert_eq!(request.variables["cartId"], json!(""));
        assert!(request.is_mutation());
    }

    #[test]
    fn add_to_cart_defaults_quantity() {
        let translator = CheckoutTranslator;
        let request = translator
            .translate(
                "AddToCart",
                &vars(json!({"sku": "WS12"})),
                &ctx_with(Some("c-1"), None),
            )
            .unwrap();
        assert_eq!(request.variables["quantity"], json!(1.0));
        assert!(request.query.contains("user_errors"));
    }

    #[test]
    fn normalizes_cart_with_projections() {
        let translator = CheckoutTranslator;
        let data = json!({
            "cart": {
                "id": "c-1",
                "total_quantity": 3.0,
                "applied_coupons": [{"code": "SAVE10"}],
                "prices": {
                    "subtotal_excluding_tax": {"value": 100.0, "currency": "USD"},
                    "grand_total": {"value": 95.0, "currency": "USD"},
                    "discounts": [
                        {"label": "10% off", "amount": {"value": 10.0, "currency": "USD"}},
                        {"label": "ignored second", "amount": {"value": 1.0, "currency": "USD"}}
                    ],
                    "applied_taxes": [{"label": "VAT", "amount": {"value": 5.0, "currency": "USD"}}]
                },
                "items": [{
                    "uid": "i-1",
                    "quantity": 3.0,
                    "product": {"sku": "WS12", "name": "Shirt",
                                "thumbnail": {"url": "http://img", "label": "Shirt"}},
                    "prices": {"price": {"value": 30.0, "currency": "USD"},
                               "row_total": {"value": 90.0, "currency": "USD"}}
                }],
                "shipping_addresses": [{
                    "selected_shipping_method": {
                        "carrier_code": "ups", "carrier_title": "UPS",
                        "method_code": "ground", "method_title": "Ground",
                        "amount": {"value": 5.0, "currency": "USD"}
                    }
                }]
            }
        });
        let normalized = translator
            .normalize("GetCart", &data, &ctx_with(Some("c-1"), None))
            .unwrap();
        let cart = &normalized["cart"];
        assert_eq!(cart["id"], "c-1");
        assert_eq!(cart["items_count"], 3);
        assert_eq!(cart["discount"]["label"], "10% off");
        assert_eq!(cart["tax"]["formatted"], "USD 5.00");
        assert_eq!(cart["shipping"]["carrier"], "UPS");
        assert_eq!(cart["applied_coupon"], "SAVE10");
        assert_eq!(cart["items"][0]["row_total"]["amount"], 90.0);
    }

    #[test]
    fn absent_projections_are_null_not_zero() {
        let translator = CheckoutTranslator;
        let data = json!({"cart": {"id": "c-2", "total_quantity": 0.0,
            "prices": {"grand_total": {"value": 0.0, "currency": "USD"}}, "items": []}});
        let normalized = translator
            .normalize("GetCart", &data, &ctx_with(Some("c-2"), None))
            .unwrap();
        let cart = &normalized["cart"];
        assert!(cart.get("discount").is_none());
        assert!(cart.get("tax").is_none());
        assert!(cart.get("shipping").is_none());
        assert!(cart.get("subtotal").is_none());
    }

    #[test]
    fn extracts_cart_from_mutation_results() {
        let data = json!({"addProductsToCart": {"cart": {"id": "c-3", "items": []}}});
        assert_eq!(extract_cart(&data).unwrap().id.as_deref(), Some("c-3"));

        let data = json!({"mergeCarts": {"id": "c-4", "items": []}});
        assert_eq!(extract_cart(&data).unwrap().id.as_deref(), Some("c-4"));

        let data = json!({"placeOrder": {"order": {"order_number": "0001"}}});
        assert!(extract_cart(&data).is_none());
    }

    #[test]
    fn place_order_normalizes_order_number() {
        let translator = CheckoutTranslator;
        let data = json!({"placeOrder": {"order": {"order_number": "000000123"}}});
        let normalized = translator
            .normalize("PlaceOrder", &data, &ctx_with(Some("c-1"), None))
            .unwrap();
        assert_eq!(normalized["order"]["id"], "000000123");

        let empty = json!({"placeOrder": null});
        let normalized = translator
            .normalize("PlaceOrder", &empty, &ctx_with(Some("c-1"), None))
            .unwrap();
        assert!(normalized["order"].is_null());
    }

    #[test]
    fn merge_carts_prefers_explicit_source() {
        let translator = CheckoutTranslator;
        let request = translator
            .translate(
                "MergeCarts",
                &vars(json!({"sourceCartId": "guest-1", "destinationCartId": "cust-1"})),
                &ctx_with(Some("other"), Some("tok")),
            )
            .unwrap();
        assert_eq!(request.variables["source"], json!("guest-1"));
        assert_eq!(request.variables["destination"], json!("cust-1"));
        assert!(request.query.contains("destination_cart_id: $destination"));
    }
}
