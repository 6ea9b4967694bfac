//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

impl Cart {
    pub fn for_user(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self { id: Uuid::now_v7(), user_id, items: vec![], created_at: now, updated_at: now }
    }

    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.touch();
    }

    pub fn update_quantity(&mut self, product_id: Uuid, quantity: u32) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        if quantity == 0 { self.items.retain(|i| i.product_id != product_id); }
        else { item.quantity = quantity; }
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Cart item not found") }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_cart_operations() {
        let p1 = Uuid::now_v7();
        let mut cart = Cart::for_user(Uuid::now_v7());
        cart.add_item(CartItem { product_id: p1, quantity: 2 });
        assert_eq!(cart.items.len(), 1);
        cart.add_item(CartItem { product_id: p1, quantity: 1 });
        assert_eq!(cart.items[0].quantity, 3); // Merged
        cart.update_quantity(p1, 5).unwrap();
        assert_eq!(cart.items[0].quantity, 5);
        cart.update_quantity(p1, 0).unwrap();
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_missing_line() {
        let mut cart = Cart::for_user(Uuid::now_v7());
        assert_eq!(cart.remove_item(Uuid::now_v7()), Err(CartError::ItemNotFound));
        assert_eq!(cart.update_quantity(Uuid::now_v7(), 2), Err(CartError::ItemNotFound));
    }
}
