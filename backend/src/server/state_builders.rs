//! Builders for the HTTP state backing the cart ports.

use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;

use storefront::domain::{CartService, ProductVariant, ProductVariantId};
use storefront::inbound::http::state::HttpState;
use storefront::outbound::memory::{InMemoryCartRepository, InMemoryCatalogue};
use storefront::outbound::persistence::{DbPool, DieselCartRepository, DieselProductVariantLookup};

use super::ServerConfig;

const DEMO_PRODUCT_ID: Uuid = Uuid::from_u128(0x6c1b_0d2e_8f3a_4c55_9e10_0000_0000_0001);

fn demo_variant(id: u128, name: &str, color: &str, price_in_cents: i32) -> ProductVariant {
    let slug = format!("canvas-tote-{}", name.to_ascii_lowercase());
    ProductVariant {
        id: ProductVariantId::from_uuid(Uuid::from_u128(id)),
        product_id: DEMO_PRODUCT_ID,
        product_name: "Canvas tote".to_owned(),
        name: name.to_owned(),
        image_url: format!("/images/{slug}.jpg"),
        slug,
        color: color.to_owned(),
        price_in_cents,
    }
}

/// Fixed catalogue served when no database is configured.
pub(super) fn demo_catalogue() -> InMemoryCatalogue {
    InMemoryCatalogue::new([
        demo_variant(0x6c1b_0d2e_8f3a_4c55_9e10_0000_0000_0101, "Natural", "#f1e9d2", 1999),
        demo_variant(0x6c1b_0d2e_8f3a_4c55_9e10_0000_0000_0102, "Navy", "#1f2a44", 2199),
        demo_variant(0x6c1b_0d2e_8f3a_4c55_9e10_0000_0000_0103, "Olive", "#556b2f", 2199),
    ])
}

fn diesel_state(pool: &DbPool) -> HttpState {
    let service = CartService::new(
        Arc::new(DieselCartRepository::new(pool.clone())),
        Arc::new(DieselProductVariantLookup::new(pool.clone())),
    );
    HttpState::from_service(Arc::new(service))
}

fn memory_state() -> HttpState {
    let service = CartService::new(
        Arc::new(InMemoryCartRepository::default()),
        Arc::new(demo_catalogue()),
    );
    HttpState::from_service(Arc::new(service))
}

/// Build the cart state using Diesel adapters when a pool is configured,
/// otherwise in-memory adapters over the demo catalogue.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => diesel_state(pool),
        None => {
            tracing::warn!("no database configured; carts are held in memory");
            memory_state()
        }
    };
    web::Data::new(state)
}
