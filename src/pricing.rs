//! Price-discount engine.
//!
//! Applies a discount to its target product, or to every member of its
//! target collection, and reverts it again. The pre-discount price is kept in
//! `original_price`, whose presence marks a product as discounted, and
//! `discount_id` names the discount that set it. At most one discount is
//! active per product and the first one wins; a revert only restores the
//! products its own discount marked.
//!
//! Writes are per product and not transactional. Collection fan-out is best
//! effort: a failed member is recorded in the [`FanOutReport`] and the rest
//! are still processed. Each per-product write is conditional, so concurrent
//! apply/revert calls cannot stack discounts or lose the restore value.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::{Discount, Product, TargetType};
use crate::store::{DiscountStore, ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Discount {0} not found")]
    DiscountNotFound(Uuid),

    #[error("Discount target {kind} {id} not found")]
    TargetNotFound { kind: TargetType, id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of applying or reverting one discount.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutReport {
    /// Products the operation looked at.
    pub attempted: usize,
    /// Products whose price was changed.
    pub succeeded: usize,
    /// Products left alone: already discounted on apply, not discounted on revert.
    pub skipped: usize,
    pub failed: Vec<FailedUpdate>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpdate {
    pub product_id: Uuid,
    pub reason: String,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool { self.failed.is_empty() }

    fn record(&mut self, product_id: Uuid, outcome: Result<bool, StoreError>) {
        self.attempted += 1;
        match outcome {
            Ok(true) => self.succeeded += 1,
            Ok(false) => self.skipped += 1,
            Err(e) => {
                warn!(%product_id, error = %e, "Product price update failed");
                self.failed.push(FailedUpdate { product_id, reason: e.to_string() });
            }
        }
    }
}

pub struct PriceDiscountEngine {
    products: Arc<dyn ProductStore>,
    discounts: Arc<dyn DiscountStore>,
}

impl PriceDiscountEngine {
    pub fn new(products: Arc<dyn ProductStore>, discounts: Arc<dyn DiscountStore>) -> Self {
        Self { products, discounts }
    }

    /// Applies `discount` to its target.
    ///
    /// A product target that does not exist is `TargetNotFound`. A collection
    /// target with no members, or whose members are all discounted already,
    /// yields a report with nothing succeeded.
    #[instrument(skip(self, discount), fields(discount_id = %discount.id, target = %discount.target_id))]
    pub async fn apply(&self, discount: &Discount) -> Result<FanOutReport, EngineError> {
        let mut report = FanOutReport::default();
        match discount.target_type {
            TargetType::Product => {
                let product = self.target_product(discount.target_id).await?;
                let outcome = self.apply_one(&product, discount).await?;
                report.record(product.id, Ok(outcome));
            }
            TargetType::Collection => {
                let members = self.products.list_products_in_collection(discount.target_id).await?;
                if members.is_empty() {
                    debug!("Collection has no member products");
                }
                for product in &members {
                    report.record(product.id, self.apply_one(product, discount).await);
                }
            }
        }
        info!(succeeded = report.succeeded, skipped = report.skipped, failed = report.failed.len(), "Discount applied");
        Ok(report)
    }

    /// Looks the discount up and reverts its effect.
    pub async fn revert(&self, discount_id: Uuid) -> Result<FanOutReport, EngineError> {
        let discount = self
            .discounts
            .get_discount(discount_id)
            .await?
            .ok_or(EngineError::DiscountNotFound(discount_id))?;
        self.revert_discount(&discount).await
    }

    /// Reverts `discount` on its target: every product it marked gets its
    /// original price back. Products held by another discount are skipped.
    #[instrument(skip(self, discount), fields(discount_id = %discount.id, target = %discount.target_id))]
    pub async fn revert_discount(&self, discount: &Discount) -> Result<FanOutReport, EngineError> {
        let mut report = FanOutReport::default();
        match discount.target_type {
            TargetType::Product => {
                let product = self.target_product(discount.target_id).await?;
                let restored = self.products.restore_original_price(product.id, discount.id).await?;
                report.record(product.id, Ok(restored.is_some()));
            }
            TargetType::Collection => {
                let members = self.products.list_products_in_collection(discount.target_id).await?;
                for product in members.iter().filter(|p| p.discounted_by(discount.id)) {
                    let outcome = self.products.restore_original_price(product.id, discount.id).await.map(|p| p.is_some());
                    report.record(product.id, outcome);
                }
                report.attempted = members.len();
                report.skipped = report.attempted - report.succeeded - report.failed.len();
            }
        }
        info!(succeeded = report.succeeded, skipped = report.skipped, failed = report.failed.len(), "Discount reverted");
        Ok(report)
    }

    async fn target_product(&self, id: Uuid) -> Result<Product, EngineError> {
        self.products
            .get_product(id)
            .await?
            .ok_or(EngineError::TargetNotFound { kind: TargetType::Product, id })
    }

    /// `Ok(false)` when the product already carries a discount, including one
    /// that landed between our read and the conditional write.
    async fn apply_one(&self, product: &Product, discount: &Discount) -> Result<bool, StoreError> {
        match product.discount_with(discount.id, discount.percentage) {
            Some(change) => self.products.mark_discounted(product.id, change).await,
            None => Ok(false),
        }
    }
}
