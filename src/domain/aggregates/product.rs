//! Product Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::{Percentage, Sku};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: Sku,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    /// Displayed price; the discounted one while a discount is active.
    pub price: f64,
    /// Present only while a discount is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Discount that set `original_price`. Only that discount can revert it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<Uuid>,
    pub image: String,
    pub tags: Vec<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a product. `original_price` is deliberately absent:
/// only the discount engine writes it.
#[derive(Clone, Debug)]
pub struct ProductDraft {
    pub sku: Sku,
    pub title: String,
    pub title_ar: String,
    pub description: String,
    pub description_ar: String,
    pub price: f64,
    pub image: String,
    pub tags: Vec<String>,
    pub stock: i32,
}

/// Outcome of computing a discount for one product.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceChange { pub discount_id: Uuid, pub previous: f64, pub discounted: f64 }

impl Product {
    pub fn create(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(), sku: draft.sku, title: draft.title, title_ar: draft.title_ar,
            description: draft.description, description_ar: draft.description_ar, price: draft.price,
            original_price: None, discount_id: None, image: draft.image, tags: dedup_tags(draft.tags), stock: draft.stock,
            created_at: now, updated_at: now,
        }
    }

    /// A zero original price is the legacy "not discounted" sentinel.
    pub fn is_discounted(&self) -> bool { matches!(self.original_price, Some(p) if p != 0.0) }

    /// Whether `discount_id` is the discount currently holding this product.
    pub fn discounted_by(&self, discount_id: Uuid) -> bool {
        self.is_discounted() && self.discount_id == Some(discount_id)
    }

    /// Price change a discount would cause, or `None` if one is already active.
    pub fn discount_with(&self, discount_id: Uuid, percentage: Percentage) -> Option<PriceChange> {
        if self.is_discounted() { return None; }
        Some(PriceChange { discount_id, previous: self.price, discounted: percentage.apply_to(self.price) })
    }

    /// Marks the product discounted by `change.discount_id`.
    pub fn mark_discounted(&mut self, change: PriceChange) {
        self.price = change.discounted;
        self.original_price = Some(change.previous);
        self.discount_id = Some(change.discount_id);
        self.touch();
    }

    /// Restores the pre-discount price if `discount_id` set it. Returns the
    /// restored price, or `None` when there was nothing of its to revert. A
    /// legacy zero original price is cleared whichever discount asks.
    pub fn revert_discount(&mut self, discount_id: Uuid) -> Option<f64> {
        match self.original_price {
            Some(original) if original == 0.0 => {
                self.original_price = None;
                self.discount_id = None;
                None
            }
            Some(original) if self.discount_id == Some(discount_id) => {
                self.price = original;
                self.original_price = None;
                self.discount_id = None;
                self.touch();
                Some(original)
            }
            _ => None,
        }
    }

    /// Applies an edit. While a discount is active the edited price replaces
    /// the displayed price only; the stored original stays the restore value.
    pub fn update(&mut self, draft: ProductDraft) {
        self.sku = draft.sku;
        self.title = draft.title;
        self.title_ar = draft.title_ar;
        self.description = draft.description;
        self.description_ar = draft.description_ar;
        self.price = draft.price;
        self.image = draft.image;
        self.tags = dedup_tags(draft.tags);
        self.stock = draft.stock;
        self.touch();
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        if !out.contains(&tag) { out.push(tag); }
    }
    out
}

#[cfg(test)]
pub(crate) fn sample(sku: &str, price: f64) -> Product {
    Product::create(ProductDraft {
        sku: Sku::new(sku).unwrap(), title: format!("Item {sku}"), title_ar: String::new(),
        description: String::new(), description_ar: String::new(), price,
        image: String::new(), tags: vec![], stock: 1,
    })
}
