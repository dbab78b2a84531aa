use std::borrow::Cow;

use log::warn;
use phf::Map;
use phf_macros::phf_map;

use super::{GTE_SUFFIX, LIMIT_PARAM, ORDER_PARAM, PAGE_PARAM, SORT_PARAM};

/// Keys the query builder emits itself from the sort and page specs.
const RESERVED_KEYS: [&str; 4] = [SORT_PARAM, ORDER_PARAM, PAGE_PARAM, LIMIT_PARAM];

/// Which of the accumulated values a key sends to the backend.
///
/// The storefront lets a shopper tick several categories or brands, but the
/// backend filters on a single value per key. The most recent selection is
/// the one that is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Only the last element of the sequence is sent
    LastSelected,
    /// The value is sent as given
    Scalar,
}

/// Wire treatment of a single filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRule {
    suffix: Option<&'static str>,
    selection: Selection,
}

impl KeyRule {
    const fn new(suffix: Option<&'static str>, selection: Selection) -> Self {
        KeyRule { suffix, selection }
    }

    const PASS_THROUGH: KeyRule = KeyRule::new(None, Selection::Scalar);

    /// Look up the rule for `key`. Keys without an entry pass through unrenamed.
    pub fn for_key(key: &str) -> KeyRule {
        KEY_RULES.get(key).copied().unwrap_or(Self::PASS_THROUGH)
    }

    pub fn wire_name<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self.suffix {
            Some(suffix) => Cow::Owned(format!("{key}{suffix}")),
            None => Cow::Borrowed(key),
        }
    }

    /// `_sort`, `_order`, `_page` and `_limit` belong to the builder.
    pub fn is_reserved(key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }
}

static KEY_RULES: Map<&'static str, KeyRule> = phf_map! {
    "category" => KeyRule::new(None, Selection::LastSelected),
    "brand" => KeyRule::new(None, Selection::LastSelected),
    // rating is a lower bound, not an exact match
    "rating" => KeyRule::new(Some(GTE_SUFFIX), Selection::Scalar),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// The single value to put on the wire, if there is one.
    ///
    /// One value per key ever reaches the backend, so a sequence always
    /// resolves to its last element. An empty sequence or a blank value
    /// resolves to nothing.
    pub fn resolve(&self) -> Option<&str> {
        let value = match self {
            FilterValue::One(value) => Some(value.as_str()),
            FilterValue::Many(values) => values.last().map(String::as_str),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn push(&mut self, value: String) {
        match self {
            FilterValue::Many(values) => values.push(value),
            FilterValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = FilterValue::Many(vec![first, value]);
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::One(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::One(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::One(value.to_string())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::One(value.to_string())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Many(values.into_iter().map(str::to_owned).collect())
    }
}

/// The active product filters, in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(String, FilterValue)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value but keeping its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Record another selection for `key`.
    ///
    /// Multi-select keys accumulate their selections; any other key simply
    /// takes the new value.
    pub fn select(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if KeyRule::for_key(&key).selection() == Selection::Scalar {
            return self.set(key, value);
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, FilterValue::Many(vec![value]))),
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Wire-ready `(key, value)` pairs in entry order.
    ///
    /// Reserved keys are skipped so paging and sorting are only ever sent once.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .filter(|(key, _)| {
                let reserved = KeyRule::is_reserved(key);
                if reserved {
                    warn!("Ignoring filter on reserved key '{}'", key);
                }
                !reserved
            })
            .filter_map(|(key, value)| {
                let rule = KeyRule::for_key(key);
                value
                    .resolve()
                    .map(|v| (rule.wire_name(key).into_owned(), v.to_owned()))
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = FilterSet::new();
        for (key, value) in iter {
            filters.set(key, value);
        }
        filters
    }
}
