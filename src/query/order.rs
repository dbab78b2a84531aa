use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub const SORT_PARAM: &str = "_sort";
pub const ORDER_PARAM: &str = "_order";

#[derive(
    AsRefStr, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// An explicit sort request: field name plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(rename = "sortBy")]
    sort_by: String,
    order: SortOrder,
}

impl SortSpec {
    pub fn new(sort_by: impl Into<String>, order: SortOrder) -> Self {
        SortSpec {
            sort_by: sort_by.into(),
            order,
        }
    }

    pub fn asc(sort_by: impl Into<String>) -> Self {
        Self::new(sort_by, SortOrder::Asc)
    }

    pub fn desc(sort_by: impl Into<String>) -> Self {
        Self::new(sort_by, SortOrder::Desc)
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// A sort with no field name carries no meaning and is sent as no sort.
    pub fn is_empty(&self) -> bool {
        self.sort_by.trim().is_empty()
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        if self.is_empty() {
            return Vec::new();
        }

        vec![
            (SORT_PARAM.to_owned(), self.sort_by.clone()),
            (ORDER_PARAM.to_owned(), self.order.to_string()),
        ]
    }
}
