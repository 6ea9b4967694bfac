//! Collection Aggregate (tag-based product grouping)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: Uuid,
    pub collection_name: String,
    pub product_ids: Vec<Uuid>,
    pub show_collection: bool,
}

impl Collection {
    pub fn create(name: impl Into<String>, show: bool) -> Self {
        Self { id: Uuid::now_v7(), collection_name: name.into(), product_ids: vec![], show_collection: show }
    }

    /// Collection created implicitly from a product tag.
    pub fn from_tag(tag: &str, product_id: Uuid) -> Self {
        let mut c = Self::create(tag, true);
        c.add_product(product_id);
        c
    }

    pub fn contains(&self, product_id: Uuid) -> bool { self.product_ids.contains(&product_id) }

    /// Set semantics: adding a member twice is a no-op.
    pub fn add_product(&mut self, product_id: Uuid) -> bool {
        if self.contains(product_id) { return false; }
        self.product_ids.push(product_id);
        true
    }

    pub fn remove_product(&mut self, product_id: Uuid) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|id| *id != product_id);
        self.product_ids.len() != before
    }
}
