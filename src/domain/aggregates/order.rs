//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::CartItem;
use crate::domain::events::{DomainEvent, OrderEvent};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_id: String,
    pub phone_number: String,
    pub user_id: Uuid,
    pub user_location: String,
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub total: f64,
    pub discounted: bool,
    pub creation_date: DateTime<Utc>,
}

/// Client-supplied order contents.
#[derive(Clone, Debug)]
pub struct OrderDetails {
    pub phone_number: String,
    pub user_location: String,
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub total: f64,
    pub discounted: bool,
}

impl Order {
    pub fn place(user_id: Uuid, details: OrderDetails) -> (Self, DomainEvent) {
        let now = Utc::now();
        let order = Self {
            id: Uuid::now_v7(), order_id: format!("OS{}", now.timestamp()), phone_number: details.phone_number,
            user_id, user_location: details.user_location, items: details.items, subtotal: details.subtotal,
            total: details.total, discounted: details.discounted, creation_date: now,
        };
        let event = DomainEvent::Order(OrderEvent::Created {
            order_id: order.id, order_number: order.order_id.clone(), user_id, total: order.total,
        });
        (order, event)
    }

    pub fn revise(&mut self, details: OrderDetails) {
        self.phone_number = details.phone_number;
        self.user_location = details.user_location;
        self.items = details.items;
        self.subtotal = details.subtotal;
        self.total = details.total;
        self.discounted = details.discounted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_order_number_format() {
        let (order, event) = Order::place(Uuid::now_v7(), OrderDetails {
            phone_number: "+96170000000".into(), user_location: "Beirut".into(),
            items: vec![CartItem { product_id: Uuid::now_v7(), quantity: 2 }],
            subtotal: 20.0, total: 18.0, discounted: true,
        });
        assert!(order.order_id.starts_with("OS"));
        assert!(order.order_id[2..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(event.subject(), "storefront.order.created");
    }
}
