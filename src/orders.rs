use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::addresses::Address;
use crate::cart::CartItem;
use crate::products::RecordId;

const LONG_DATE_FORMAT: &str = "%B %-d, %Y";

/// Fulfilment state of an order. Orders only ever move forward.
#[derive(
    AsRefStr, EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Processing,
    Shipped,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub width_percent: u8,
    pub reached: bool,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Order placed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// How far along the progress bar this status sits.
    pub fn width_percent(&self) -> u8 {
        match self {
            OrderStatus::Created => 10,
            OrderStatus::Processing => 38,
            OrderStatus::Shipped => 63,
            OrderStatus::Delivered => 100,
        }
    }

    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Created => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// All four steps, marking those at or before `self` as reached.
    pub fn progress_steps(&self) -> Vec<ProgressStep> {
        OrderStatus::iter()
            .map(|status| ProgressStep {
                status,
                label: status.label(),
                width_percent: status.width_percent(),
                reached: status <= *self,
            })
            .collect()
    }

    fn update_prefix(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Order placed on",
            OrderStatus::Processing => "Processing on",
            OrderStatus::Shipped => "Shipped on",
            OrderStatus::Delivered => "Delivered on",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub card_no: String,
    pub card_expiry: String,
}

impl PaymentDetails {
    pub fn card_last_four(&self) -> &str {
        let digits = self.card_no.trim();
        let start = digits
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &digits[start..]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: RecordId,
    pub items: Vec<CartItem>,
    pub status: OrderStatus,
    /// RFC 3339 timestamp of the last status change
    pub date: String,
    pub delivery_address: Address,
    pub payment_details: PaymentDetails,
    pub total: f64,
    pub shipping_charges: f64,
    pub tax: f64,
    pub amount_paid: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn progress_steps(&self) -> Vec<ProgressStep> {
        self.status.progress_steps()
    }

    /// `Month D, YYYY`, or the raw string if it isn't RFC 3339.
    pub fn formatted_date(&self) -> String {
        format_long_date(&self.date)
    }

    /// e.g. `Shipped on March 4, 2024`
    pub fn status_update(&self) -> String {
        format!("{} {}", self.status.update_prefix(), self.formatted_date())
    }
}

pub fn format_long_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(date) => date.format(LONG_DATE_FORMAT).to_string(),
        Err(_) => iso.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn order(status: &str) -> Order {
        serde_json::from_value(json!({
            "id": 12,
            "items": [],
            "status": status,
            "date": "2024-03-04T10:15:00.000Z",
            "deliveryAddress": {
                "id": 1,
                "fullname": "Asha Rao",
                "phoneNo": "9876543210",
                "line1": "12 MG Road",
                "line2": "Indiranagar",
                "city": "Bengaluru",
                "state": "Karnataka",
                "country": "India",
                "postalCode": "560038",
                "default": true
            },
            "paymentDetails": { "cardNo": "4111111111111234", "cardExpiry": "08/27" },
            "total": 1000,
            "shippingCharges": 30,
            "tax": 20,
            "amountPaid": 1050,
            "userId": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_progress_widths() {
        let widths: Vec<_> = OrderStatus::iter().map(|s| s.width_percent()).collect();
        assert_eq!(widths, vec![10, 38, 63, 100]);
    }

    #[test]
    fn test_progress_steps_reached() {
        let steps = OrderStatus::Processing.progress_steps();
        let reached: Vec<_> = steps.iter().map(|s| s.reached).collect();
        assert_eq!(reached, vec![true, true, false, false]);
        assert_eq!(steps[0].label, "Order placed");
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(OrderStatus::Created.next(), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::Shipped.next(), Some(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.is_terminal());
        assert!("cancelled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_update() {
        assert_eq!(order("created").status_update(), "Order placed on March 4, 2024");
        assert_eq!(order("shipped").status_update(), "Shipped on March 4, 2024");
        assert_eq!(order("delivered").progress_steps().iter().filter(|s| s.reached).count(), 4);
    }

    #[test]
    fn test_order_fields() {
        let order = order("processing");
        assert_eq!(order.payment_details.card_last_four(), "1234");
        assert_eq!(order.amount_paid, 1050.0);
        assert_eq!(order.extra.get("userId"), Some(&json!(3)));
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        assert_eq!(format_long_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_short_card_number() {
        let payment = PaymentDetails {
            card_no: "42".into(),
            card_expiry: "01/30".into(),
        };
        assert_eq!(payment.card_last_four(), "42");
    }
}
