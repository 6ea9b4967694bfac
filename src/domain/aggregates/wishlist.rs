//! Wishlist Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub wishlist_items: Vec<WishlistItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: Uuid,
    pub product_id: Uuid,
}

impl Wishlist {
    pub fn for_user(user_id: Uuid) -> Self {
        Self { id: Uuid::now_v7(), user_id, created_at: Utc::now(), wishlist_items: vec![] }
    }

    pub fn add(&mut self, product_id: Uuid) -> WishlistItem {
        let item = WishlistItem { id: Uuid::now_v7(), product_id };
        self.wishlist_items.push(item.clone());
        item
    }

    /// Returns whether an item was removed.
    pub fn remove(&mut self, item_id: Uuid) -> bool {
        let before = self.wishlist_items.len();
        self.wishlist_items.retain(|i| i.id != item_id);
        before != self.wishlist_items.len()
    }
}
