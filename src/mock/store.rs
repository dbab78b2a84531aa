use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::query::{
    SortOrder, GTE_SUFFIX, LIMIT_PARAM, ORDER_PARAM, PAGE_PARAM, SORT_PARAM,
};

pub type Record = Map<String, Value>;

const LTE_SUFFIX: &str = "_lte";
const NE_SUFFIX: &str = "_ne";
const DEFAULT_LIMIT: usize = 10;

static SAMPLE_DB: &str = include_str!("../../data/db.json");

/// In-memory collections, shaped like a json-server `db.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub products: Vec<Record>,
    #[serde(default)]
    pub brands: Vec<Value>,
    #[serde(default)]
    pub categories: Vec<Value>,
}

/// One page of a product listing plus the count before paging.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub items: Vec<Record>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(String, Vec<String>),
    Ne(String, String),
    Gte(String, f64),
    Lte(String, f64),
}

impl Condition {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::Eq(field, values) => record
                .get(field)
                .map(|v| values.iter().any(|want| scalar_text(v) == *want))
                .unwrap_or(false),
            Condition::Ne(field, value) => record
                .get(field)
                .map(|v| scalar_text(v) != *value)
                .unwrap_or(true),
            Condition::Gte(field, bound) => record
                .get(field)
                .and_then(number)
                .map(|n| n >= *bound)
                .unwrap_or(false),
            Condition::Lte(field, bound) => record
                .get(field)
                .and_then(number)
                .map(|n| n <= *bound)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Default)]
struct ListParams {
    conditions: Vec<Condition>,
    sort: Option<(String, SortOrder)>,
    page: Option<usize>,
    limit: Option<usize>,
}

impl ListParams {
    fn parse(params: &[(String, String)]) -> Self {
        let mut parsed = ListParams::default();
        let mut sort_field = None;
        let mut order = SortOrder::Asc;

        for (key, value) in params {
            match key.as_str() {
                SORT_PARAM => sort_field = Some(value.clone()),
                ORDER_PARAM => order = value.parse().unwrap_or_default(),
                PAGE_PARAM => parsed.page = value.parse().ok().filter(|p| *p > 0),
                LIMIT_PARAM => parsed.limit = value.parse().ok(),
                _ => parsed.add_condition(key, value),
            }
        }

        parsed.sort = sort_field.map(|field| (field, order));
        parsed
    }

    fn add_condition(&mut self, key: &str, value: &str) {
        if let Some(field) = key.strip_suffix(GTE_SUFFIX) {
            if let Ok(bound) = value.parse() {
                self.conditions.push(Condition::Gte(field.to_owned(), bound));
            }
        } else if let Some(field) = key.strip_suffix(LTE_SUFFIX) {
            if let Ok(bound) = value.parse() {
                self.conditions.push(Condition::Lte(field.to_owned(), bound));
            }
        } else if let Some(field) = key.strip_suffix(NE_SUFFIX) {
            self.conditions
                .push(Condition::Ne(field.to_owned(), value.to_owned()));
        } else {
            // Repeating a key means "any of these"
            for condition in &mut self.conditions {
                if let Condition::Eq(field, values) = condition {
                    if field == key {
                        values.push(value.to_owned());
                        return;
                    }
                }
            }
            self.conditions
                .push(Condition::Eq(key.to_owned(), vec![value.to_owned()]));
        }
    }
}

impl Store {
    /// Read a json-server style database file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let store: Store = serde_json::from_str(&text)?;
        info!(
            "Loaded {} products, {} brands, {} categories from {}",
            store.products.len(),
            store.brands.len(),
            store.categories.len(),
            path.display()
        );
        Ok(store)
    }

    /// The bundled demo catalog.
    pub fn sample() -> Result<Self> {
        Ok(serde_json::from_str(SAMPLE_DB)?)
    }

    /// Filter, sort and page products the way json-server does.
    ///
    /// Soft-deleted rows are listed like any other. The count reflects every
    /// match, not just the returned page.
    pub fn list_products(&self, params: &[(String, String)]) -> Listing {
        let params = ListParams::parse(params);

        let mut matched: Vec<&Record> = self
            .products
            .iter()
            .filter(|record| params.conditions.iter().all(|c| c.matches(record)))
            .collect();

        if let Some((field, order)) = &params.sort {
            matched.sort_by(|a, b| {
                let ord = compare_field(a.get(field), b.get(field));
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total_count = matched.len();

        let items = match (params.page, params.limit) {
            (None, None) => matched,
            (page, limit) => {
                let limit = limit.unwrap_or(DEFAULT_LIMIT);
                let start = (page.unwrap_or(1) - 1).saturating_mul(limit);
                matched.into_iter().skip(start).take(limit).collect()
            }
        };

        Listing {
            items: items.into_iter().cloned().collect(),
            total_count,
        }
    }

    pub fn get_product(&self, id: &str) -> Option<&Record> {
        self.products.iter().find(|record| record_id(record) == Some(id.to_owned()))
    }

    /// Append a product, assigning the next numeric id when none is given.
    pub fn insert_product(&mut self, mut record: Record) -> Record {
        if !record.contains_key("id") {
            let next_id = self
                .products
                .iter()
                .filter_map(|r| r.get("id").and_then(Value::as_u64))
                .max()
                .unwrap_or(0)
                + 1;
            record.insert("id".into(), Value::from(next_id));
        }
        self.products.push(record.clone());
        record
    }

    /// Shallow-merge `changes` into the product. The id never changes.
    pub fn patch_product(&mut self, id: &str, mut changes: Record) -> Option<Record> {
        let record = self
            .products
            .iter_mut()
            .find(|record| record_id(record) == Some(id.to_owned()))?;

        changes.remove("id");
        record.extend(changes);
        Some(record.clone())
    }
}

fn record_id(record: &Record) -> Option<String> {
    record.get("id").map(scalar_text)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => scalar_text(a).cmp(&scalar_text(b)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> Store {
        serde_json::from_value(json!({
            "products": [
                { "id": 1, "title": "Phone A", "category": "phones", "brand": "Apple", "price": 900, "rating": 4.5 },
                { "id": 2, "title": "Phone B", "category": "phones", "brand": "Oppo", "price": 300, "rating": 3.9, "deleted": true },
                { "id": 3, "title": "Laptop", "category": "laptops", "brand": "Apple", "price": 1500, "rating": 4.8 },
                { "id": 4, "title": "Phone C", "category": "phones", "brand": "Samsung", "price": 600, "rating": 4.1 }
            ],
            "brands": [{ "value": "Apple", "label": "Apple" }],
            "categories": [{ "value": "phones", "label": "Phones" }]
        }))
        .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ids(listing: &Listing) -> Vec<u64> {
        listing
            .items
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_u64))
            .collect()
    }

    #[test]
    fn test_equality_and_gte() {
        let listing = store().list_products(&params(&[("category", "phones"), ("rating_gte", "4")]));
        assert_eq!(ids(&listing), vec![1, 4]);
        assert_eq!(listing.total_count, 2);
    }

    #[test]
    fn test_deleted_rows_are_listed() {
        let listing = store().list_products(&params(&[("brand", "Oppo")]));
        assert_eq!(ids(&listing), vec![2]);
    }

    #[test]
    fn test_sort_numeric_desc() {
        let listing = store().list_products(&params(&[("_sort", "price"), ("_order", "desc")]));
        assert_eq!(ids(&listing), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_paging_counts_all_matches() {
        let listing = store().list_products(&params(&[
            ("_sort", "price"),
            ("_order", "asc"),
            ("_page", "2"),
            ("_limit", "2"),
        ]));
        assert_eq!(ids(&listing), vec![1, 3]);
        assert_eq!(listing.total_count, 4);
    }

    #[test]
    fn test_repeated_key_is_any_of() {
        let listing = store().list_products(&params(&[("brand", "Apple"), ("brand", "Samsung")]));
        assert_eq!(ids(&listing), vec![1, 3, 4]);
    }

    #[test]
    fn test_lte_and_ne() {
        let listing =
            store().list_products(&params(&[("price_lte", "900"), ("brand_ne", "Oppo")]));
        assert_eq!(ids(&listing), vec![1, 4]);
    }

    #[test]
    fn test_insert_assigns_next_id() {
        let mut store = store();
        let record = store.insert_product(
            json!({ "title": "Tablet", "price": 450 })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(record.get("id"), Some(&json!(5)));
        assert!(store.get_product("5").is_some());
    }

    #[test]
    fn test_patch_merges_and_keeps_id() {
        let mut store = store();
        let patched = store
            .patch_product(
                "3",
                json!({ "id": 99, "price": 1400 }).as_object().cloned().unwrap(),
            )
            .unwrap();
        assert_eq!(patched.get("id"), Some(&json!(3)));
        assert_eq!(patched.get("price"), Some(&json!(1400)));
        assert_eq!(patched.get("title"), Some(&json!("Laptop")));

        assert!(store.patch_product("42", Record::new()).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, serde_json::to_string(&store()).unwrap()).unwrap();

        let loaded = Store::load(&path).unwrap();
        assert_eq!(loaded, store());
    }

    #[test]
    fn test_sample_catalog_parses() {
        let sample = Store::sample().unwrap();
        assert!(!sample.products.is_empty());
        assert!(!sample.brands.is_empty());
        assert!(!sample.categories.is_empty());
    }
}
