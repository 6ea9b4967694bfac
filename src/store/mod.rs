//! Store collaborator.
//!
//! One trait per resource. Handlers and the discount engine only see
//! `Arc<dyn ...Store>`; [`PgStore`] backs them in production and
//! [`MemoryStore`] in tests and local development.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{
    Announcement, Cart, Collection, Discount, Order, PriceChange, Product, User, Wishlist,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fails with `Conflict` when the SKU is taken.
    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn list_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    /// Members of the collection, i.e. products listed in its `productIds`.
    async fn list_products_in_collection(&self, collection_id: Uuid) -> Result<Vec<Product>>;
    /// Writes the editable fields. Never touches `original_price` or `discount_id`.
    async fn update_product(&self, product: &Product) -> Result<bool>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;
    /// Compare-and-set: writes the discounted price and its owning discount
    /// only while the product is still undiscounted and still priced at
    /// `change.previous`.
    async fn mark_discounted(&self, id: Uuid, change: PriceChange) -> Result<bool>;
    /// Atomically moves `original_price` back into `price` and clears it, but
    /// only when `discount_id` set it. Returns the restored price, or `None`
    /// when the product holds no discount of `discount_id`. A legacy zero
    /// `original_price` is cleared without touching `price`.
    async fn restore_original_price(&self, id: Uuid, discount_id: Uuid) -> Result<Option<f64>>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Fails with `Conflict` when the name is taken.
    async fn insert_collection(&self, collection: &Collection) -> Result<()>;
    async fn get_collection(&self, id: Uuid) -> Result<Option<Collection>>;
    async fn list_collections(&self, visible_only: bool) -> Result<Vec<Collection>>;
    async fn update_collection(&self, collection: &Collection) -> Result<bool>;
    async fn delete_collection(&self, id: Uuid) -> Result<bool>;
    /// Adds the product to the collection named `tag`, creating a visible
    /// collection when none exists.
    async fn add_to_tag(&self, tag: &str, product_id: Uuid) -> Result<()>;
    async fn remove_from_tag(&self, tag: &str, product_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait DiscountStore: Send + Sync {
    async fn insert_discount(&self, discount: &Discount) -> Result<()>;
    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>>;
    async fn list_discounts(&self) -> Result<Vec<Discount>>;
    async fn update_discount(&self, discount: &Discount) -> Result<bool>;
    async fn delete_discount(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>>;
    async fn save_cart(&self, cart: &Cart) -> Result<()>;
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
    async fn get_wishlist(&self, user_id: Uuid) -> Result<Option<Wishlist>>;
    async fn save_wishlist(&self, wishlist: &Wishlist) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<()>;
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
    async fn list_orders(&self) -> Result<Vec<Order>>;
    async fn update_order(&self, order: &Order) -> Result<bool>;
    async fn delete_order(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn update_user(&self, user: &User) -> Result<bool>;
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn insert_announcement(&self, announcement: &Announcement) -> Result<()>;
    async fn get_announcement(&self, id: Uuid) -> Result<Option<Announcement>>;
    async fn list_announcements(&self) -> Result<Vec<Announcement>>;
    async fn update_announcement(&self, announcement: &Announcement) -> Result<bool>;
    async fn delete_announcement(&self, id: Uuid) -> Result<bool>;
}

/// Handles to every store, cloned into the application state.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub collections: Arc<dyn CollectionStore>,
    pub discounts: Arc<dyn DiscountStore>,
    pub carts: Arc<dyn CartStore>,
    pub wishlists: Arc<dyn WishlistStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pub announcements: Arc<dyn AnnouncementStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProductStore + CollectionStore + DiscountStore + CartStore + WishlistStore
            + OrderStore + UserStore + AnnouncementStore + 'static,
    {
        Self {
            products: backend.clone(),
            collections: backend.clone(),
            discounts: backend.clone(),
            carts: backend.clone(),
            wishlists: backend.clone(),
            orders: backend.clone(),
            users: backend.clone(),
            announcements: backend,
        }
    }
}
