//! In-memory store for tests and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AnnouncementStore, CartStore, CollectionStore, DiscountStore, OrderStore, ProductStore, Result,
    StoreError, UserStore, WishlistStore,
};
use crate::domain::aggregates::{
    Announcement, Cart, Collection, Discount, Order, PriceChange, Product, User, Wishlist,
};

/// Keys are UUIDv7, so `BTreeMap` iteration is creation order.
#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<BTreeMap<Uuid, Product>>,
    collections: RwLock<BTreeMap<Uuid, Collection>>,
    discounts: RwLock<BTreeMap<Uuid, Discount>>,
    carts: RwLock<BTreeMap<Uuid, Cart>>,
    wishlists: RwLock<BTreeMap<Uuid, Wishlist>>,
    orders: RwLock<BTreeMap<Uuid, Order>>,
    users: RwLock<BTreeMap<Uuid, User>>,
    announcements: RwLock<BTreeMap<Uuid, Announcement>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.values().any(|p| p.sku == product.sku) {
            return Err(StoreError::Conflict(format!("sku {} already exists", product.sku)));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn list_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    async fn list_products_in_collection(&self, collection_id: Uuid) -> Result<Vec<Product>> {
        let members = match self.collections.read().await.get(&collection_id) {
            Some(c) => c.product_ids.clone(),
            None => return Ok(vec![]),
        };
        self.list_products_by_ids(&members).await
    }

    async fn update_product(&self, product: &Product) -> Result<bool> {
        let mut products = self.products.write().await;
        if products.values().any(|p| p.sku == product.sku && p.id != product.id) {
            return Err(StoreError::Conflict(format!("sku {} already exists", product.sku)));
        }
        let Some(stored) = products.get_mut(&product.id) else { return Ok(false) };
        let (original_price, discount_id) = (stored.original_price, stored.discount_id);
        *stored = product.clone();
        stored.original_price = original_price;
        stored.discount_id = discount_id;
        Ok(true)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn mark_discounted(&self, id: Uuid, change: PriceChange) -> Result<bool> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else { return Ok(false) };
        if product.is_discounted() || product.price != change.previous {
            return Ok(false);
        }
        product.mark_discounted(change);
        Ok(true)
    }

    async fn restore_original_price(&self, id: Uuid, discount_id: Uuid) -> Result<Option<f64>> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(&id).and_then(|p| p.revert_discount(discount_id)))
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn insert_collection(&self, collection: &Collection) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.values().any(|c| c.collection_name == collection.collection_name) {
            return Err(StoreError::Conflict(format!("collection {} already exists", collection.collection_name)));
        }
        collections.insert(collection.id, collection.clone());
        Ok(())
    }

    async fn get_collection(&self, id: Uuid) -> Result<Option<Collection>> {
        Ok(self.collections.read().await.get(&id).cloned())
    }

    async fn list_collections(&self, visible_only: bool) -> Result<Vec<Collection>> {
        let collections = self.collections.read().await;
        Ok(collections.values().filter(|c| !visible_only || c.show_collection).cloned().collect())
    }

    async fn update_collection(&self, collection: &Collection) -> Result<bool> {
        let mut collections = self.collections.write().await;
        if collections.values().any(|c| c.collection_name == collection.collection_name && c.id != collection.id) {
            return Err(StoreError::Conflict(format!("collection {} already exists", collection.collection_name)));
        }
        let Some(stored) = collections.get_mut(&collection.id) else { return Ok(false) };
        *stored = collection.clone();
        Ok(true)
    }

    async fn delete_collection(&self, id: Uuid) -> Result<bool> {
        Ok(self.collections.write().await.remove(&id).is_some())
    }

    async fn add_to_tag(&self, tag: &str, product_id: Uuid) -> Result<()> {
        let mut collections = self.collections.write().await;
        match collections.values_mut().find(|c| c.collection_name == tag) {
            Some(existing) => {
                existing.add_product(product_id);
            }
            None => {
                let created = Collection::from_tag(tag, product_id);
                collections.insert(created.id, created);
            }
        }
        Ok(())
    }

    async fn remove_from_tag(&self, tag: &str, product_id: Uuid) -> Result<()> {
        let mut collections = self.collections.write().await;
        for c in collections.values_mut().filter(|c| c.collection_name == tag) {
            c.remove_product(product_id);
        }
        Ok(())
    }
}

#[async_trait]
impl DiscountStore for MemoryStore {
    async fn insert_discount(&self, discount: &Discount) -> Result<()> {
        self.discounts.write().await.insert(discount.id, discount.clone());
        Ok(())
    }

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>> {
        Ok(self.discounts.read().await.get(&id).cloned())
    }

    async fn list_discounts(&self) -> Result<Vec<Discount>> {
        Ok(self.discounts.read().await.values().cloned().collect())
    }

    async fn update_discount(&self, discount: &Discount) -> Result<bool> {
        let mut discounts = self.discounts.write().await;
        let Some(stored) = discounts.get_mut(&discount.id) else { return Ok(false) };
        *stored = discount.clone();
        Ok(true)
    }

    async fn delete_discount(&self, id: Uuid) -> Result<bool> {
        Ok(self.discounts.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn get_wishlist(&self, user_id: Uuid) -> Result<Option<Wishlist>> {
        Ok(self.wishlists.read().await.get(&user_id).cloned())
    }

    async fn save_wishlist(&self, wishlist: &Wishlist) -> Result<()> {
        self.wishlists.write().await.insert(wishlist.user_id, wishlist.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        // Newest first, as the SQL store returns them.
        Ok(self.orders.read().await.values().rev().cloned().collect())
    }

    async fn update_order(&self, order: &Order) -> Result<bool> {
        let mut orders = self.orders.write().await;
        let Some(stored) = orders.get_mut(&order.id) else { return Ok(false) };
        *stored = order.clone();
        Ok(true)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn update_user(&self, user: &User) -> Result<bool> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(StoreError::Conflict("email already exists".to_string()));
        }
        let Some(stored) = users.get_mut(&user.id) else { return Ok(false) };
        *stored = user.clone();
        Ok(true)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn insert_announcement(&self, announcement: &Announcement) -> Result<()> {
        self.announcements.write().await.insert(announcement.id, announcement.clone());
        Ok(())
    }

    async fn get_announcement(&self, id: Uuid) -> Result<Option<Announcement>> {
        Ok(self.announcements.read().await.get(&id).cloned())
    }

    async fn list_announcements(&self) -> Result<Vec<Announcement>> {
        Ok(self.announcements.read().await.values().cloned().collect())
    }

    async fn update_announcement(&self, announcement: &Announcement) -> Result<bool> {
        let mut announcements = self.announcements.write().await;
        let Some(stored) = announcements.get_mut(&announcement.id) else { return Ok(false) };
        *stored = announcement.clone();
        Ok(true)
    }

    async fn delete_announcement(&self, id: Uuid) -> Result<bool> {
        Ok(self.announcements.write().await.remove(&id).is_some())
    }
}
