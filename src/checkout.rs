use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::cart::Cart;

/// Flat tax added to every order.
pub const TAX: f64 = 20.0;

#[derive(
    AsRefStr, EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
}

impl DeliveryOption {
    pub fn shipping_time(&self) -> &'static str {
        match self {
            DeliveryOption::Standard => "4-10 business days",
            DeliveryOption::Express => "2-5 business days",
        }
    }

    pub fn shipping_charges(&self) -> f64 {
        match self {
            DeliveryOption::Standard => 30.0,
            DeliveryOption::Express => 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub total: f64,
}

impl CheckoutSummary {
    pub fn compute(cart: &Cart, delivery: DeliveryOption) -> Self {
        let subtotal = cart.subtotal();
        let shipping = delivery.shipping_charges();

        CheckoutSummary {
            subtotal,
            shipping,
            tax: TAX,
            total: subtotal + shipping + TAX,
        }
    }
}
