use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Record identifier as issued by the backend.
///
/// json-server has used both numeric and string ids over its versions, so both
/// are accepted and written back in the form they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Num(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        match id.parse::<u64>() {
            Ok(num) => RecordId::Num(num),
            Err(_) => RecordId::Text(id.to_owned()),
        }
    }
}

pub type ProductId = RecordId;

/// A catalog product.
///
/// Only the fields the storefront reasons about are typed. Everything else the
/// backend sends is kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Fields for a product that doesn't exist yet. The backend assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A partial update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }
}

/// Body of a soft delete. There is no way back from `deleted`.
#[derive(Debug, Serialize)]
pub(crate) struct SoftDelete {
    pub deleted: bool,
}

impl SoftDelete {
    pub const BODY: SoftDelete = SoftDelete { deleted: true };
}

/// One page of search results.
///
/// `total_count` is the backend's count for the whole filtered set and is
/// taken from the response header as-is. Soft-deleted rows are dropped from
/// `items` after the fact, so `total_count` can exceed what paging through
/// `items` would suggest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQueryResult {
    pub items: Vec<Product>,
    pub total_count: u64,
}

impl ProductQueryResult {
    /// Drop soft-deleted rows, keeping the order of the rest.
    pub fn from_raw(raw: Vec<Product>, total_count: u64) -> Self {
        ProductQueryResult {
            items: visible(raw),
            total_count,
        }
    }
}

pub(crate) fn visible(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(|p| !p.is_deleted()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn product(id: u64, deleted: bool) -> Product {
        serde_json::from_value(json!({ "id": id, "title": format!("p{id}"), "price": 10.0, "deleted": deleted }))
            .unwrap()
    }

    #[test]
    fn test_product_id_forms() {
        assert_eq!(ProductId::from("42"), ProductId::Num(42));
        assert_eq!(ProductId::from("a1b2"), ProductId::Text("a1b2".into()));

        let text: ProductId = serde_json::from_value(json!("x9")).unwrap();
        assert_eq!(text.to_string(), "x9");
        let num: ProductId = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(num, ProductId::Num(9));
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = json!({
            "id": 1,
            "title": "Phone",
            "price": 499.0,
            "discountPercentage": 12.5,
            "images": ["a.png"],
        });
        let product: Product = serde_json::from_value(raw).unwrap();
        assert!(!product.deleted);
        assert_eq!(product.extra.get("discountPercentage"), Some(&json!(12.5)));

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["images"], json!(["a.png"]));
        assert_eq!(back["deleted"], json!(false));
    }

    #[test]
    fn test_result_drops_deleted_and_keeps_count() {
        let result = ProductQueryResult::from_raw(
            vec![product(1, false), product(2, true), product(3, false)],
            3,
        );

        let ids: Vec<_> = result.items.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![ProductId::Num(1), ProductId::Num(3)]);
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn test_patch_only_sends_set_fields() {
        let patch = ProductPatch {
            price: Some(99.0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "price": 99.0 }));
        assert!(!patch.is_empty());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_soft_delete_body() {
        assert_eq!(
            serde_json::to_value(&SoftDelete::BODY).unwrap(),
            json!({ "deleted": true })
        );
    }
}
