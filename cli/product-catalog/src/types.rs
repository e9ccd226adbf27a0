//! Product catalog wire types.
//!
//! [`Product`] is what the API hands back when listing the collection,
//! [`NewProduct`] and [`ProductUpdate`] are the bodies we send.
//! Numbers typed into a form are coerced the way a browser form handler
//! would coerce them, see [`parse_float`] and [`parse_int`].

use derive_more::{Display, From};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque identifier assigned by the server.
///
/// Servers disagree on how to encode ids, so strings, numbers and
/// Mongo extended JSON (`{"$oid": "..."}`) are all accepted.
/// The identifier is always handled as text on our side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Text(String),
    Number(serde_json::Number),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = match RawProductId::deserialize(deserializer)? {
            RawProductId::Text(id) => id,
            RawProductId::Number(id) => id.to_string(),
            RawProductId::ObjectId { oid } => oid,
        };
        Ok(ProductId(id))
    }
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

/// A product record as returned by `GET {base}/products`.
///
/// Only `name` and `price` are needed for display,
/// everything else is carried along for `--json` output.
///
/// The server stores whatever it was sent, so records are read leniently:
/// a field of the wrong type is coerced where possible and dropped otherwise,
/// one odd record never fails the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProduct")]
pub struct Product {
    /// Absent if the server projects the id away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub stock: Option<i64>,
}

/// A product record exactly as received.
///
/// Mongo backed servers send `_id`, others `id`, some both.
#[derive(Deserialize)]
struct RawProduct {
    #[serde(default, rename = "_id")]
    object_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    category: Option<Value>,
    #[serde(default)]
    stock: Option<Value>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            // `_id` is the one the server addresses records by
            id: raw
                .object_id
                .and_then(lenient_id)
                .or_else(|| raw.id.and_then(lenient_id)),
            name: raw.name.and_then(lenient_text).unwrap_or_default(),
            price: raw.price.and_then(lenient_float),
            description: raw.description.and_then(lenient_text),
            category: raw.category.and_then(lenient_text),
            stock: raw.stock.and_then(lenient_int),
        }
    }
}

fn lenient_id(value: Value) -> Option<ProductId> {
    ProductId::deserialize(value).ok()
}

fn lenient_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn lenient_float(value: Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_float(&text),
        _ => None,
    }
}

fn lenient_int(value: Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .map(f64::trunc)
                .filter(|n| *n >= i64::MIN as f64 && *n < i64::MAX as f64)
                .map(|n| n as i64)
        }),
        Value::String(text) => parse_int(&text),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Write models
// ---------------------------------------------------------------------------

/// Raw text of the product form at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub stock: String,
}

/// Body of `POST {base}/products`.
///
/// Numeric fields that could not be coerced are sent as `null`,
/// nothing is validated before sending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Option<f64>,
    pub description: String,
    pub category: String,
    pub stock: Option<i64>,
}

impl From<ProductForm> for NewProduct {
    fn from(form: ProductForm) -> Self {
        NewProduct {
            price: parse_float(&form.price),
            stock: parse_int(&form.stock),
            name: form.name,
            description: form.description,
            category: form.category,
        }
    }
}

/// Partially filled product form, `None` for fields left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdateForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: Option<String>,
}

/// Body of `PUT {base}/products/{id}`.
///
/// Only fields that were given are serialized.
/// A given but uncoercible number is sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<Option<i64>>,
}

impl ProductUpdate {
    /// True if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self == &ProductUpdate::default()
    }
}

impl From<ProductUpdateForm> for ProductUpdate {
    fn from(form: ProductUpdateForm) -> Self {
        ProductUpdate {
            name: form.name,
            price: form.price.as_deref().map(parse_float),
            description: form.description,
            category: form.category,
            stock: form.stock.as_deref().map(parse_int),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient number coercion
// ---------------------------------------------------------------------------

/// Coerce form text to a float the way `parseFloat` does.
///
/// Leading whitespace is skipped and the longest numeric prefix is used,
/// so `"12.5abc"` is `12.5` and `".5"` is `0.5`.
/// Returns `None` where `parseFloat` yields `NaN` or an infinity,
/// since neither survives JSON encoding.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        },
        Some(b'+') => {
            pos += 1;
            false
        },
        _ => false,
    };

    if text[pos..].starts_with("Infinity") {
        return None;
    }

    let int_start = pos;
    pos += count_digits(&bytes[pos..], 10);
    let int_digits = &text[int_start..pos];

    let mut frac_digits = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        let frac_len = count_digits(&bytes[frac_start..], 10);
        frac_digits = &text[frac_start..frac_start + frac_len];
        pos = frac_start + frac_len;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent = "";
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_pos = pos + 1;
        if matches!(bytes.get(exp_pos), Some(b'+' | b'-')) {
            exp_pos += 1;
        }
        let exp_len = count_digits(&bytes[exp_pos..], 10);
        if exp_len > 0 {
            exponent = &text[pos..exp_pos + exp_len];
        }
    }

    let normalized = format!(
        "{sign}{int}.{frac}{exponent}",
        sign = if negative { "-" } else { "" },
        int = if int_digits.is_empty() { "0" } else { int_digits },
        frac = if frac_digits.is_empty() { "0" } else { frac_digits },
    );

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Coerce form text to an integer the way `parseInt` without a radix does.
///
/// Leading whitespace is skipped, a `0x` prefix switches to hexadecimal and
/// parsing stops at the first non-digit, so `"3.7"` is `3`.
/// Returns `None` where `parseInt` yields `NaN` and for values outside `i64`.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = match rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, rest),
    };

    let len = count_digits(digits.as_bytes(), radix);
    if len == 0 {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits[..len], radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

fn count_digits(bytes: &[u8], radix: u32) -> usize {
    bytes
        .iter()
        .take_while(|byte| char::from(**byte).is_digit(radix))
        .count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn product_from_listing_without_optional_fields() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"id": "1", "name": "Widget", "price": 9.99, "stock": 5}
        ]))
        .unwrap();

        assert_eq!(products, vec![Product {
            id: Some(ProductId::from("1")),
            name: "Widget".to_string(),
            price: Some(9.99),
            description: None,
            category: None,
            stock: Some(5),
        }]);
    }

    #[test]
    fn product_id_encodings() {
        let ids: Vec<Product> = serde_json::from_value(json!([
            {"_id": "65f0c0ffee", "name": "a"},
            {"id": 42, "name": "b"},
            {"_id": {"$oid": "65f0c0ffee"}, "name": "c"},
            {"name": "d"},
        ]))
        .unwrap();

        let ids = ids.into_iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![
            Some(ProductId::from("65f0c0ffee")),
            Some(ProductId::from("42")),
            Some(ProductId::from("65f0c0ffee")),
            None,
        ]);
    }

    #[test]
    fn product_with_both_ids_prefers_object_id() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"_id": "65f0c0ffee", "id": "7", "name": "Widget", "price": 9.99},
            {"_id": null, "id": "8", "name": "Gadget"},
            {"_id": true, "name": "Gizmo"},
        ]))
        .unwrap();

        let ids = products.into_iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![
            Some(ProductId::from("65f0c0ffee")),
            Some(ProductId::from("8")),
            None,
        ]);
    }

    #[test]
    fn product_with_null_fields() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"_id": "a", "name": null, "price": null, "description": null, "stock": null}
        ]))
        .unwrap();

        assert_eq!(products, vec![Product {
            id: Some(ProductId::from("a")),
            name: String::new(),
            price: None,
            description: None,
            category: None,
            stock: None,
        }]);
    }

    #[test]
    fn product_with_loosely_typed_fields() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"_id": "a", "name": 12, "price": "9.99", "category": ["x"], "stock": 5.0},
            {"_id": "b", "name": "Gadget", "price": "cheap", "stock": "3 left"},
            {"_id": "c", "name": "Gizmo", "price": true, "stock": 2.7},
        ]))
        .unwrap();

        assert_eq!(products.len(), 3);

        assert_eq!(products[0].name, "12");
        assert_eq!(products[0].price, Some(9.99));
        assert_eq!(products[0].category.as_deref(), Some(r#"["x"]"#));
        assert_eq!(products[0].stock, Some(5));

        assert_eq!(products[1].price, None);
        assert_eq!(products[1].stock, Some(3));

        assert_eq!(products[2].price, None);
        assert_eq!(products[2].stock, Some(2));
    }

    #[test]
    fn new_product_from_form() {
        let form = ProductForm {
            name: "Gadget".to_string(),
            price: "12.5".to_string(),
            description: "A gadget".to_string(),
            category: "tools".to_string(),
            stock: "3".to_string(),
        };

        let body = serde_json::to_value(NewProduct::from(form)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Gadget",
                "price": 12.5,
                "description": "A gadget",
                "category": "tools",
                "stock": 3
            })
        );
    }

    /// Nothing is validated, uncoercible numbers become `null`
    #[test]
    fn new_product_from_empty_form() {
        let body = serde_json::to_value(NewProduct::from(ProductForm::default())).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "",
                "price": null,
                "description": "",
                "category": "",
                "stock": null
            })
        );
    }

    #[test]
    fn update_only_serializes_given_fields() {
        let update = ProductUpdate::from(ProductUpdateForm {
            price: Some("abc".to_string()),
            stock: Some("7".to_string()),
            ..Default::default()
        });

        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({"price": null, "stock": 7})
        );
        assert!(ProductUpdate::from(ProductUpdateForm::default()).is_empty());
    }

    #[test]
    fn parse_float_prefixes() {
        assert_eq!(parse_float("12.5"), Some(12.5));
        assert_eq!(parse_float("  9.99 dollars"), Some(9.99));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("-3e2x"), Some(-300.0));
        assert_eq!(parse_float("1e"), Some(1.0));
        assert_eq!(parse_float("+7"), Some(7.0));
        assert_eq!(parse_float("1.2.3"), Some(1.2));
    }

    #[test]
    fn parse_float_nan_and_infinity() {
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float("Infinity"), None);
        assert_eq!(parse_float("-Infinity"), None);
        assert_eq!(parse_float("1e400"), None);
    }

    #[test]
    fn parse_int_prefixes() {
        assert_eq!(parse_int("3"), Some(3));
        assert_eq!(parse_int(" 3.7"), Some(3));
        assert_eq!(parse_int("-12abc"), Some(-12));
        assert_eq!(parse_int("0x1A"), Some(26));
        assert_eq!(parse_int("1e3"), Some(1));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("x"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    proptest! {
        #[test]
        fn parse_int_agrees_with_std(value in any::<i64>(), suffix in "[a-wyz. ]{0,4}") {
            prop_assert_eq!(parse_int(&format!("{value}{suffix}")), Some(value));
        }

        #[test]
        fn parse_float_agrees_with_std(value in -1.0e12..1.0e12_f64) {
            let text = value.to_string();
            prop_assert_eq!(parse_float(&text), text.parse::<f64>().ok());
        }
    }
}
