//! `PostgreSQL` store.
//!
//! Nested document fields (cart lines, wishlist items, order lines) live in
//! JSONB columns; tags and collection members are native arrays.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AnnouncementStore, CartStore, CollectionStore, DiscountStore, OrderStore, ProductStore, Result,
    StoreError, UserStore, WishlistStore,
};
use crate::domain::aggregates::{
    Announcement, Cart, CartItem, Collection, Discount, Order, PriceChange, Product, User, Wishlist,
    WishlistItem,
};
use crate::domain::value_objects::{Percentage, Sku};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_or(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{what} already exists"));
        }
    }
    StoreError::Database(e)
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid, sku: String, title: String, title_ar: String, description: String, description_ar: String,
    price: f64, original_price: Option<f64>, discount_id: Option<Uuid>, image: String, tags: Vec<String>, stock: i32,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;
    fn try_from(r: ProductRow) -> Result<Self> {
        let sku = Sku::new(r.sku).map_err(|e| StoreError::Corrupt(format!("product {}: {e}", r.id)))?;
        Ok(Product {
            id: r.id, sku, title: r.title, title_ar: r.title_ar, description: r.description,
            description_ar: r.description_ar, price: r.price, original_price: r.original_price, discount_id: r.discount_id, image: r.image,
            tags: r.tags, stock: r.stock, created_at: r.created_at, updated_at: r.updated_at,
        })
    }
}

fn products(rows: Vec<ProductRow>) -> Result<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

const PRODUCT_COLUMNS: &str = "id, sku, title, title_ar, description, description_ar, price, original_price, discount_id, image, tags, stock, created_at, updated_at";

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, p: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, sku, title, title_ar, description, description_ar, price, original_price, image, tags, stock, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, $8, $9, $10, $11, $12)")
            .bind(p.id).bind(p.sku.as_str()).bind(&p.title).bind(&p.title_ar).bind(&p.description).bind(&p.description_ar)
            .bind(p.price).bind(&p.image).bind(&p.tags).bind(p.stock).bind(p.created_at).bind(p.updated_at)
            .execute(&self.pool).await.map_err(|e| conflict_or(e, "sku"))?;
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?.map(Product::try_from).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        products(sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at"))
            .fetch_all(&self.pool).await?)
    }

    async fn list_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        products(sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY created_at"))
            .bind(ids).fetch_all(&self.pool).await?)
    }

    async fn list_products_in_collection(&self, collection_id: Uuid) -> Result<Vec<Product>> {
        products(sqlx::query_as::<_, ProductRow>(
            "SELECT p.id, p.sku, p.title, p.title_ar, p.description, p.description_ar, p.price, p.original_price, p.discount_id, p.image, p.tags, p.stock, p.created_at, p.updated_at \
             FROM products p JOIN collections c ON p.id = ANY(c.product_ids) WHERE c.id = $1 ORDER BY p.created_at")
            .bind(collection_id).fetch_all(&self.pool).await?)
    }

    async fn update_product(&self, p: &Product) -> Result<bool> {
        let res = sqlx::query("UPDATE products SET sku = $2, title = $3, title_ar = $4, description = $5, description_ar = $6, price = $7, image = $8, tags = $9, stock = $10, updated_at = $11 WHERE id = $1")
            .bind(p.id).bind(p.sku.as_str()).bind(&p.title).bind(&p.title_ar).bind(&p.description).bind(&p.description_ar)
            .bind(p.price).bind(&p.image).bind(&p.tags).bind(p.stock).bind(p.updated_at)
            .execute(&self.pool).await.map_err(|e| conflict_or(e, "sku"))?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }

    async fn mark_discounted(&self, id: Uuid, change: PriceChange) -> Result<bool> {
        let res = sqlx::query("UPDATE products SET price = $2, original_price = $3, discount_id = $4, updated_at = NOW() WHERE id = $1 AND price = $3 AND (original_price IS NULL OR original_price = 0)")
            .bind(id).bind(change.discounted).bind(change.previous).bind(change.discount_id)
            .execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }

    async fn restore_original_price(&self, id: Uuid, discount_id: Uuid) -> Result<Option<f64>> {
        // `prior` is the row as locked before the update, so a zero marker can
        // be told apart from a real restore.
        let prior: Option<(f64,)> = sqlx::query_as(
            "WITH prior AS (SELECT id, original_price FROM products WHERE id = $1 FOR UPDATE) \
             UPDATE products p SET price = CASE WHEN prior.original_price <> 0 THEN prior.original_price ELSE p.price END, \
                 original_price = NULL, discount_id = NULL, updated_at = NOW() \
             FROM prior WHERE p.id = prior.id AND (prior.original_price = 0 OR (prior.original_price IS NOT NULL AND p.discount_id = $2)) \
             RETURNING prior.original_price")
            .bind(id).bind(discount_id).fetch_optional(&self.pool).await?;
        Ok(prior.map(|(original,)| original).filter(|original| *original != 0.0))
    }
}

#[derive(sqlx::FromRow)]
struct CollectionRow { id: Uuid, collection_name: String, product_ids: Vec<Uuid>, show_collection: bool }

impl From<CollectionRow> for Collection {
    fn from(r: CollectionRow) -> Self {
        Collection { id: r.id, collection_name: r.collection_name, product_ids: r.product_ids, show_collection: r.show_collection }
    }
}

#[async_trait]
impl CollectionStore for PgStore {
    async fn insert_collection(&self, c: &Collection) -> Result<()> {
        sqlx::query("INSERT INTO collections (id, collection_name, product_ids, show_collection) VALUES ($1, $2, $3, $4)")
            .bind(c.id).bind(&c.collection_name).bind(&c.product_ids).bind(c.show_collection)
            .execute(&self.pool).await.map_err(|e| conflict_or(e, "collection name"))?;
        Ok(())
    }

    async fn get_collection(&self, id: Uuid) -> Result<Option<Collection>> {
        Ok(sqlx::query_as::<_, CollectionRow>("SELECT id, collection_name, product_ids, show_collection FROM collections WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?.map(Collection::from))
    }

    async fn list_collections(&self, visible_only: bool) -> Result<Vec<Collection>> {
        let rows = sqlx::query_as::<_, CollectionRow>("SELECT id, collection_name, product_ids, show_collection FROM collections WHERE show_collection OR NOT $1 ORDER BY id")
            .bind(visible_only).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Collection::from).collect())
    }

    async fn update_collection(&self, c: &Collection) -> Result<bool> {
        let res = sqlx::query("UPDATE collections SET collection_name = $2, product_ids = $3, show_collection = $4 WHERE id = $1")
            .bind(c.id).bind(&c.collection_name).bind(&c.product_ids).bind(c.show_collection)
            .execute(&self.pool).await.map_err(|e| conflict_or(e, "collection name"))?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_collection(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM collections WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }

    async fn add_to_tag(&self, tag: &str, product_id: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO collections (id, collection_name, product_ids, show_collection) VALUES ($1, $2, ARRAY[$3]::UUID[], TRUE) \
                     ON CONFLICT (collection_name) DO UPDATE SET product_ids = CASE WHEN $3 = ANY(collections.product_ids) THEN collections.product_ids ELSE array_append(collections.product_ids, $3) END")
            .bind(Uuid::now_v7()).bind(tag).bind(product_id)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn remove_from_tag(&self, tag: &str, product_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE collections SET product_ids = array_remove(product_ids, $2) WHERE collection_name = $1")
            .bind(tag).bind(product_id).execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DiscountRow { id: Uuid, target_type: String, target_id: Uuid, percentage: f64, created_at: DateTime<Utc>, updated_at: DateTime<Utc> }

impl TryFrom<DiscountRow> for Discount {
    type Error = StoreError;
    fn try_from(r: DiscountRow) -> Result<Self> {
        let target_type = r.target_type.parse().map_err(|e| StoreError::Corrupt(format!("discount {}: {e}", r.id)))?;
        let percentage = Percentage::new(r.percentage).map_err(|e| StoreError::Corrupt(format!("discount {}: {e}", r.id)))?;
        Ok(Discount { id: r.id, target_type, target_id: r.target_id, percentage, created_at: r.created_at, updated_at: r.updated_at })
    }
}

#[async_trait]
impl DiscountStore for PgStore {
    async fn insert_discount(&self, d: &Discount) -> Result<()> {
        sqlx::query("INSERT INTO discounts (id, target_type, target_id, percentage, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(d.id).bind(d.target_type.as_str()).bind(d.target_id).bind(d.percentage.value()).bind(d.created_at).bind(d.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>> {
        sqlx::query_as::<_, DiscountRow>("SELECT id, target_type, target_id, percentage, created_at, updated_at FROM discounts WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?.map(Discount::try_from).transpose()
    }

    async fn list_discounts(&self) -> Result<Vec<Discount>> {
        sqlx::query_as::<_, DiscountRow>("SELECT id, target_type, target_id, percentage, created_at, updated_at FROM discounts ORDER BY created_at")
            .fetch_all(&self.pool).await?.into_iter().map(Discount::try_from).collect()
    }

    async fn update_discount(&self, d: &Discount) -> Result<bool> {
        let res = sqlx::query("UPDATE discounts SET target_type = $2, target_id = $3, percentage = $4, updated_at = $5 WHERE id = $1")
            .bind(d.id).bind(d.target_type.as_str()).bind(d.target_id).bind(d.percentage.value()).bind(d.updated_at)
            .execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_discount(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM discounts WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }
}

#[derive(sqlx::FromRow)]
struct CartRow { id: Uuid, user_id: Uuid, items: Json<Vec<CartItem>>, created_at: DateTime<Utc>, updated_at: DateTime<Utc> }

#[async_trait]
impl CartStore for PgStore {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>("SELECT id, user_id, items, created_at, updated_at FROM carts WHERE user_id = $1")
            .bind(user_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| Cart { id: r.id, user_id: r.user_id, items: r.items.0, created_at: r.created_at, updated_at: r.updated_at }))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query("INSERT INTO carts (user_id, id, items, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) \
                     ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at")
            .bind(cart.user_id).bind(cart.id).bind(Json(&cart.items)).bind(cart.created_at).bind(cart.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct WishlistRow { id: Uuid, user_id: Uuid, wishlist_items: Json<Vec<WishlistItem>>, created_at: DateTime<Utc> }

#[async_trait]
impl WishlistStore for PgStore {
    async fn get_wishlist(&self, user_id: Uuid) -> Result<Option<Wishlist>> {
        let row = sqlx::query_as::<_, WishlistRow>("SELECT id, user_id, wishlist_items, created_at FROM wishlists WHERE user_id = $1")
            .bind(user_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| Wishlist { id: r.id, user_id: r.user_id, created_at: r.created_at, wishlist_items: r.wishlist_items.0 }))
    }

    async fn save_wishlist(&self, w: &Wishlist) -> Result<()> {
        sqlx::query("INSERT INTO wishlists (user_id, id, wishlist_items, created_at) VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (user_id) DO UPDATE SET wishlist_items = EXCLUDED.wishlist_items")
            .bind(w.user_id).bind(w.id).bind(Json(&w.wishlist_items)).bind(w.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid, order_id: String, phone_number: String, user_id: Uuid, user_location: String,
    items: Json<Vec<CartItem>>, subtotal: f64, total: f64, discounted: bool, creation_date: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Order {
            id: r.id, order_id: r.order_id, phone_number: r.phone_number, user_id: r.user_id, user_location: r.user_location,
            items: r.items.0, subtotal: r.subtotal, total: r.total, discounted: r.discounted, creation_date: r.creation_date,
        }
    }
}

const ORDER_COLUMNS: &str = "id, order_id, phone_number, user_id, user_location, items, subtotal, total, discounted, creation_date";

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, o: &Order) -> Result<()> {
        sqlx::query(&format!("INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"))
            .bind(o.id).bind(&o.order_id).bind(&o.phone_number).bind(o.user_id).bind(&o.user_location)
            .bind(Json(&o.items)).bind(o.subtotal).bind(o.total).bind(o.discounted).bind(o.creation_date)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?.map(Order::from))
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY creation_date DESC"))
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn update_order(&self, o: &Order) -> Result<bool> {
        let res = sqlx::query("UPDATE orders SET phone_number = $2, user_location = $3, items = $4, subtotal = $5, total = $6, discounted = $7 WHERE id = $1")
            .bind(o.id).bind(&o.phone_number).bind(&o.user_location).bind(Json(&o.items)).bind(o.subtotal).bind(o.total).bind(o.discounted)
            .execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }
}

#[derive(sqlx::FromRow)]
struct UserRow { id: Uuid, first_name: String, last_name: String, phone_number: String, location: String, email: String, password_hash: String }

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id, first_name: r.first_name, last_name: r.last_name, phone_number: r.phone_number,
            location: r.location, email: r.email, password_hash: r.password_hash,
        }
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, phone_number, location, email, password_hash";

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, u: &User) -> Result<()> {
        sqlx::query(&format!("INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"))
            .bind(u.id).bind(&u.first_name).bind(&u.last_name).bind(&u.phone_number).bind(&u.location).bind(&u.email).bind(&u.password_hash)
            .execute(&self.pool).await.map_err(|e| conflict_or(e, "email"))?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email).fetch_optional(&self.pool).await?.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, u: &User) -> Result<bool> {
        let res = sqlx::query("UPDATE users SET first_name = $2, last_name = $3, phone_number = $4, location = $5, email = $6 WHERE id = $1")
            .bind(u.id).bind(&u.first_name).bind(&u.last_name).bind(&u.phone_number).bind(&u.location).bind(&u.email)
            .execute(&self.pool).await.map_err(|e| conflict_or(e, "email"))?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }
}

#[derive(sqlx::FromRow)]
struct AnnouncementRow { id: Uuid, message: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc> }

impl From<AnnouncementRow> for Announcement {
    fn from(r: AnnouncementRow) -> Self {
        Announcement { id: r.id, message: r.message, created_at: r.created_at, updated_at: r.updated_at }
    }
}

#[async_trait]
impl AnnouncementStore for PgStore {
    async fn insert_announcement(&self, a: &Announcement) -> Result<()> {
        sqlx::query("INSERT INTO announcements (id, message, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(a.id).bind(&a.message).bind(a.created_at).bind(a.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn get_announcement(&self, id: Uuid) -> Result<Option<Announcement>> {
        Ok(sqlx::query_as::<_, AnnouncementRow>("SELECT id, message, created_at, updated_at FROM announcements WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?.map(Announcement::from))
    }

    async fn list_announcements(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>("SELECT id, message, created_at, updated_at FROM announcements ORDER BY created_at")
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    async fn update_announcement(&self, a: &Announcement) -> Result<bool> {
        let res = sqlx::query("UPDATE announcements SET message = $2, updated_at = $3 WHERE id = $1")
            .bind(a.id).bind(&a.message).bind(a.updated_at)
            .execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_announcement(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM announcements WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() == 1)
    }
}
