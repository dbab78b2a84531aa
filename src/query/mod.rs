//! Product search requests.
//!
//! A [`ProductQuery`] is serialized into the json-server style query string
//! the backend understands. Filters come first in the order they were set,
//! followed by the optional sort and finally the page. Values are interpolated
//! as-is; escaping is left to the transport.
mod filter;
mod order;
mod page;

pub use filter::{FilterSet, FilterValue, KeyRule, Selection};
pub use order::{SortOrder, SortSpec, ORDER_PARAM, SORT_PARAM};
pub use page::{PageSpec, LIMIT_PARAM, PAGE_PARAM};

/// Suffix the backend understands as "greater than or equal".
pub const GTE_SUFFIX: &str = "_gte";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    filters: FilterSet,
    sort: Option<SortSpec>,
    page: PageSpec,
}

impl ProductQuery {
    pub fn new(filters: FilterSet, sort: Option<SortSpec>, page: PageSpec) -> Self {
        ProductQuery {
            filters,
            sort,
            page,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> PageSpec {
        self.page
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page(mut self, page: PageSpec) -> Self {
        self.page = page;
        self
    }

    /// Every query parameter, in wire order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.filters.to_pairs();

        if let Some(sort) = &self.sort {
            pairs.extend(sort.to_pairs());
        }

        pairs.extend(self.page.to_pairs());
        pairs
    }

    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_full_query_string() {
        let mut filters = FilterSet::new();
        filters
            .set("category", vec!["electronics", "phones"])
            .set("rating", 4u32);

        let query = ProductQuery::new(
            filters,
            Some(SortSpec::asc("price")),
            PageSpec::new(1, 10).unwrap(),
        );

        assert_eq!(
            query.to_query_string(),
            "category=phones&rating_gte=4&_sort=price&_order=asc&_page=1&_limit=10"
        );
    }

    #[test]
    fn test_pagination_only() {
        let query = ProductQuery::default().with_page(PageSpec::new(2, 5).unwrap());
        assert_eq!(query.to_query_string(), "_page=2&_limit=5");
    }

    #[test]
    fn test_empty_sort_is_omitted() {
        let query = ProductQuery::default().with_sort(SortSpec::asc(""));
        assert_eq!(query.to_query_string(), "_page=1&_limit=10");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let filters: FilterSet = [("title", "usb c & more")].into_iter().collect();
        let query = ProductQuery::new(filters, None, PageSpec::default());
        assert_eq!(query.to_query_string(), "title=usb c & more&_page=1&_limit=10");
    }

    #[test]
    fn test_empty_filter_value_is_omitted() {
        let filters: FilterSet = [("brand", "")].into_iter().collect();
        let query = ProductQuery::new(filters, None, PageSpec::default());
        assert_eq!(query.to_query_string(), "_page=1&_limit=10");
    }

    #[test]
    fn test_filter_cannot_override_paging() {
        let filters: FilterSet = [("_page", "7"), ("brand", "Apple")].into_iter().collect();
        let query = ProductQuery::new(filters, None, PageSpec::default());
        assert_eq!(query.to_query_string(), "brand=Apple&_page=1&_limit=10");
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("category".to_owned()),
            Just("brand".to_owned()),
            Just("rating".to_owned()),
            Just("_page".to_owned()),
            "[a-z]{1,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_query_string_is_well_formed(
            entries in prop::collection::vec(
                (key_strategy(), prop::collection::vec("[a-z0-9 ]{0,6}", 0..4)),
                0..6,
            ),
            page in 1u32..50,
            limit in 1u32..100,
        ) {
            let mut filters = FilterSet::new();
            for (key, values) in &entries {
                filters.set(key.clone(), values.clone());
            }
            let query = ProductQuery::new(filters, None, PageSpec::new(page, limit).unwrap());
            let qs = query.to_query_string();

            prop_assert!(!qs.ends_with('&'));
            prop_assert!(!qs.contains("&&"));
            prop_assert!(qs.split('&').all(|segment| !segment.ends_with('=')));
            let expected_tail = format!("_page={page}&_limit={limit}");
            prop_assert!(qs.ends_with(&expected_tail));
            prop_assert_eq!(qs.matches("_page=").count(), 1);
            prop_assert!(!qs.split('&').any(|segment| segment.starts_with("rating=")));
        }

        #[test]
        fn prop_multi_select_sends_last(values in prop::collection::vec("[a-z]{1,6}", 1..5)) {
            let mut filters = FilterSet::new();
            for value in &values {
                filters.select("category", value.clone());
            }
            let query = ProductQuery::new(filters, None, PageSpec::default());
            let expected = format!("category={}&_page=1&_limit=10", values[values.len() - 1]);
            prop_assert_eq!(query.to_query_string(), expected);
        }
    }
}
