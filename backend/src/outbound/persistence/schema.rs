//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Catalogue products. Owned by the catalogue; read-only here.
    product (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name shown alongside each variant.
        name -> Text,
        /// URL-friendly unique slug.
        slug -> Text,
        /// Long-form description.
        description -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Purchasable variants of a product.
    product_variant (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning product (cascade delete).
        product_id -> Uuid,
        /// Variant name.
        name -> Text,
        /// URL-friendly unique slug.
        slug -> Text,
        /// Colour label.
        color -> Text,
        /// Unit price in integer cents.
        price_in_cents -> Int4,
        /// Product image location.
        image_url -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shopping carts. At most one per user (`user_id` is unique).
    cart (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user's opaque identity-provider id.
        user_id -> Text,
        /// Reserved for checkout; never written by cart mutations.
        shipping_address_id -> Nullable<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cart lines. Unique per `(cart_id, product_variant_id)`; quantity is
    /// constrained to be at least one.
    cart_item (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning cart (cascade delete).
        cart_id -> Uuid,
        /// Referenced variant (cascade delete).
        product_variant_id -> Uuid,
        /// Units of the variant in the cart.
        quantity -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(product_variant -> product (product_id));
diesel::joinable!(cart_item -> cart (cart_id));
diesel::joinable!(cart_item -> product_variant (product_variant_id));

diesel::allow_tables_to_appear_in_same_query!(product, product_variant, cart, cart_item);
