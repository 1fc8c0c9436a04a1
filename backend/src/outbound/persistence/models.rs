//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{cart, cart_item, product, product_variant};

/// Row struct for reading from the cart table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cart)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CartRow {
    pub id: Uuid,
    pub user_id: String,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating a cart.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cart)]
pub(crate) struct NewCartRow<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
}

// ---------------------------------------------------------------------------
// Cart item models
// ---------------------------------------------------------------------------

/// Row struct for reading from the cart_item table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cart_item)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_variant_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for a new cart line.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cart_item)]
pub(crate) struct NewCartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_variant_id: Uuid,
    pub quantity: i32,
}

// ---------------------------------------------------------------------------
// Catalogue models
// ---------------------------------------------------------------------------

/// Variant columns needed by the cart read model.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_variant)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductVariantRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub price_in_cents: i32,
    pub image_url: String,
}

/// Product columns joined onto a variant.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductNameRow {
    pub name: String,
}
