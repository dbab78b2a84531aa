use serde::{Deserialize, Serialize};

use crate::products::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: RecordId,
    pub fullname: String,
    pub phone_no: String,
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    #[serde(default)]
    pub default: bool,
}

/// The first address flagged as the default.
pub fn default_address(addresses: &[Address]) -> Option<&Address> {
    addresses.iter().find(|address| address.default)
}

/// Default address first, then every non-default address in its original order.
pub fn display_order(addresses: &[Address]) -> Vec<&Address> {
    default_address(addresses)
        .into_iter()
        .chain(addresses.iter().filter(|address| !address.default))
        .collect()
}
