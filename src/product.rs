use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Catalog identifier. The API sends either numbers or strings, so it is
/// normalised to its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
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

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single catalog entry as rendered by the table and details views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// `None` only for malformed API rows; the pipeline drops those.
    pub id: Option<ProductId>,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub image: String,
}

impl Product {
    /// Price formatted for display.
    pub fn price_label(&self) -> String {
        format!("${:.2}", self.price)
    }
}

// ── Value extraction helpers ──

// Fields are looked up under their canonical name first, then under the
// legacy names some catalog deployments still send.
const CATEGORY_KEYS: [&str; 2] = ["category", "main_category"];
const PRICE_KEYS: [&str; 2] = ["price", "compare_price"];
const IMAGE_KEYS: [&str; 2] = ["image", "manufacturerImage"];

fn field<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !v.is_null())
}

fn val_id(v: Option<&Value>) -> Option<ProductId> {
    match v? {
        Value::Number(n) => Some(ProductId::new(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(ProductId::new(s.trim())),
        _ => None,
    }
}

fn val_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn val_f64(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Map one JSON row from the catalog API onto a [`Product`].
///
/// This is the only place that knows the wire field names. Rows that are
/// not JSON objects are rejected.
pub fn raw_json_to_product(value: Value) -> Result<Product, serde_json::Error> {
    let row: Map<String, Value> = serde_json::from_value(value)?;
    Ok(Product {
        id: val_id(row.get("id")),
        name: val_string(row.get("name")),
        category: val_string(field(&row, &CATEGORY_KEYS)),
        price: val_f64(field(&row, &PRICE_KEYS)),
        image: val_string(field(&row, &IMAGE_KEYS)),
    })
}
