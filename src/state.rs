//! Shared application state.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::images::ImageHost;
use crate::pricing::PriceDiscountEngine;
use crate::publisher::EventPublisher;
use crate::store::Stores;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    stores: Stores,
    engine: PriceDiscountEngine,
    tokens: TokenIssuer,
    images: Option<ImageHost>,
    events: EventPublisher,
}

impl AppState {
    pub fn new(stores: Stores, tokens: TokenIssuer, images: Option<ImageHost>, events: EventPublisher) -> Self {
        let engine = PriceDiscountEngine::new(stores.products.clone(), stores.discounts.clone());
        Self { inner: Arc::new(Inner { stores, engine, tokens, images, events }) }
    }

    pub fn stores(&self) -> &Stores { &self.inner.stores }
    pub fn engine(&self) -> &PriceDiscountEngine { &self.inner.engine }
    pub fn tokens(&self) -> &TokenIssuer { &self.inner.tokens }
    /// `None` when no image host credentials are configured.
    pub fn images(&self) -> Option<&ImageHost> { self.inner.images.as_ref() }
    pub fn events(&self) -> &EventPublisher { &self.inner.events }
}
