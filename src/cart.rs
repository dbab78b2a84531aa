use serde::{Deserialize, Serialize};

use crate::products::{Product, ProductId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// A shopper's cart, in the order items were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Most recently added first, as the cart page lists them.
    pub fn display_order(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().rev()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn item(id: u64, price: f64, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::Num(100 + id),
            product: serde_json::from_value(json!({ "id": id, "title": format!("p{id}"), "price": price }))
                .unwrap(),
            quantity,
        }
    }

    #[test]
    fn test_subtotal() {
        let cart = Cart::new(vec![item(1, 250.0, 2), item(2, 99.5, 1)]);
        assert_eq!(cart.subtotal(), 599.5);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), 0.0);
        assert_eq!(cart.display_order().count(), 0);
    }

    #[test]
    fn test_display_order_is_newest_first() {
        let cart = Cart::new(vec![item(1, 1.0, 1), item(2, 1.0, 1), item(3, 1.0, 1)]);
        let order: Vec<_> = cart.display_order().map(|i| i.id.clone()).collect();
        assert_eq!(
            order,
            vec![ProductId::Num(103), ProductId::Num(102), ProductId::Num(101)]
        );
    }
}
