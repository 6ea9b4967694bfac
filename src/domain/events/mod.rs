//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "lowercase")]
pub enum DomainEvent {
    Product(ProductEvent),
    Discount(DiscountEvent),
    Order(OrderEvent),
}

impl DomainEvent {
    /// NATS subject the event is published on, e.g. `storefront.discount.applied`.
    pub fn subject(&self) -> String {
        let (aggregate, name) = match self {
            Self::Product(e) => ("product", e.name()),
            Self::Discount(e) => ("discount", e.name()),
            Self::Order(e) => ("order", e.name()),
        };
        format!("storefront.{aggregate}.{name}")
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ProductEvent {
    Created { product_id: Uuid, sku: String },
    Updated { product_id: Uuid },
    Deleted { product_id: Uuid },
}

impl ProductEvent {
    fn name(&self) -> &'static str {
        match self { Self::Created { .. } => "created", Self::Updated { .. } => "updated", Self::Deleted { .. } => "deleted" }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DiscountEvent {
    Applied { discount_id: Uuid, target_id: Uuid, succeeded: usize, failed: usize },
    Reverted { discount_id: Uuid, target_id: Uuid, succeeded: usize, failed: usize },
    Deleted { discount_id: Uuid },
}

impl DiscountEvent {
    fn name(&self) -> &'static str {
        match self { Self::Applied { .. } => "applied", Self::Reverted { .. } => "reverted", Self::Deleted { .. } => "deleted" }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderEvent {
    Created { order_id: Uuid, order_number: String, user_id: Uuid, total: f64 },
    Updated { order_id: Uuid },
    Deleted { order_id: Uuid },
}

impl OrderEvent {
    fn name(&self) -> &'static str {
        match self { Self::Created { .. } => "created", Self::Updated { .. } => "updated", Self::Deleted { .. } => "deleted" }
    }
}
