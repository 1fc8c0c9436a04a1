//! Driving ports for cart mutations and cart reads.
//!
//! Payloads arrive unvalidated; implementations validate them before any
//! identity or storage access so malformed input never has side effects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::cart::parse_identifier;
use crate::domain::{
    CartItemId, CartSummary, CartValidationError, Error, ProductVariantId, Quantity, UserId,
};

/// Raw add-to-cart payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
    pub product_variant_id: String,
    pub quantity: i64,
}

/// Validated add-to-cart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddToCart {
    pub product_variant_id: ProductVariantId,
    pub quantity: Quantity,
}

impl TryFrom<AddToCartPayload> for AddToCart {
    type Error = CartValidationError;

    fn try_from(value: AddToCartPayload) -> Result<Self, Self::Error> {
        let product_variant_id =
            parse_identifier(&value.product_variant_id, "productVariantId")?;
        Ok(Self {
            product_variant_id: ProductVariantId::from_uuid(product_variant_id),
            quantity: Quantity::new(value.quantity)?,
        })
    }
}

/// Raw payload addressing one cart line (decrease and remove).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub cart_item_id: String,
}

impl TryFrom<CartItemPayload> for CartItemId {
    type Error = CartValidationError;

    fn try_from(value: CartItemPayload) -> Result<Self, Self::Error> {
        parse_identifier(&value.cart_item_id, "cartItemId").map(CartItemId::from_uuid)
    }
}

/// Cart mutations. None of them return data; success means persisted.
///
/// `user_id` is the identity resolved for the calling request, `None` when
/// the caller is anonymous.
#[async_trait]
pub trait CartCommand: Send + Sync {
    /// Add `quantity` more of a variant, creating the cart lazily.
    ///
    /// Repeated calls accumulate; this is not idempotent.
    async fn add_to_cart(
        &self,
        user_id: Option<&UserId>,
        payload: AddToCartPayload,
    ) -> Result<(), Error>;

    /// Remove exactly one unit from a line, deleting it at one.
    async fn decrease_cart_item_quantity(
        &self,
        user_id: Option<&UserId>,
        payload: CartItemPayload,
    ) -> Result<(), Error>;

    /// Delete a line regardless of quantity.
    async fn remove_cart_item(
        &self,
        user_id: Option<&UserId>,
        payload: CartItemPayload,
    ) -> Result<(), Error>;
}

/// Cart reads.
#[async_trait]
pub trait CartQuery: Send + Sync {
    /// Priced snapshot of the caller's cart; empty when none exists yet.
    async fn fetch_cart(&self, user_id: Option<&UserId>) -> Result<CartSummary, Error>;
}
