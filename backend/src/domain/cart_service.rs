//! Cart domain service implementing the cart driving ports.
//!
//! Every operation follows the same order: validate the payload, require an
//! identity, resolve referenced entities, then apply exactly one atomic state
//! transition through the repository.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AddToCart, AddToCartPayload, CartCommand, CartItemPayload, CartQuery, CartRepository,
    CartRepositoryError, ProductVariantLookup, ProductVariantLookupError,
};
use crate::domain::{
    CartItemId, CartItemRecord, CartLine, CartSummary, CartValidationError,
    DecrementOutcome, Error, UserId,
};

/// Cart service wiring the repository and catalogue ports together.
#[derive(Clone)]
pub struct CartService<R, C> {
    carts: Arc<R>,
    catalogue: Arc<C>,
}

impl<R, C> CartService<R, C> {
    /// Create a new service with the given ports.
    pub fn new(carts: Arc<R>, catalogue: Arc<C>) -> Self {
        Self { carts, catalogue }
    }
}

impl<R, C> CartService<R, C>
where
    R: CartRepository,
    C: ProductVariantLookup,
{
    fn map_cart_error(error: CartRepositoryError) -> Error {
        match error {
            CartRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("cart repository unavailable: {message}"))
            }
            CartRepositoryError::Query { message } => {
                Error::internal(format!("cart repository error: {message}"))
            }
            CartRepositoryError::DuplicateCart { user_id } => {
                Error::conflict("cart already exists").with_details(json!({
                    "userId": user_id,
                    "code": "duplicate_cart",
                }))
            }
            CartRepositoryError::ItemNotFound { item_id } => {
                Self::item_not_found(&item_id)
            }
            CartRepositoryError::VariantNotFound { product_variant_id } => {
                Self::variant_not_found(&product_variant_id)
            }
            CartRepositoryError::QuantityOverflow { item_id } => {
                Error::invalid_request("cart item quantity limit reached").with_details(json!({
                    "field": "quantity",
                    "cartItemId": item_id,
                    "code": "quantity_too_large",
                }))
            }
        }
    }

    fn map_lookup_error(error: ProductVariantLookupError) -> Error {
        match error {
            ProductVariantLookupError::Connection { message } => {
                Error::service_unavailable(format!("catalogue unavailable: {message}"))
            }
            ProductVariantLookupError::Query { message } => {
                Error::internal(format!("catalogue error: {message}"))
            }
        }
    }

    fn validation_error(error: CartValidationError) -> Error {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": error.field(),
            "code": error.code(),
        }))
    }

    fn variant_not_found(product_variant_id: &str) -> Error {
        Error::not_found("product variant not found")
            .with_details(json!({ "productVariantId": product_variant_id }))
    }

    fn item_not_found(item_id: &str) -> Error {
        Error::not_found("cart item not found").with_details(json!({ "cartItemId": item_id }))
    }

    fn require_user(user_id: Option<&UserId>) -> Result<&UserId, Error> {
        user_id.ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Add to the user's cart, creating the cart together with its first line.
    ///
    /// Two first-time adds can race; the loser sees `DuplicateCart`, re-reads
    /// the winner's cart and adds to it instead.
    async fn add_line(
        &self,
        user_id: &UserId,
        request: &AddToCart,
    ) -> Result<CartItemRecord, Error> {
        let existing = self
            .carts
            .find_cart_by_user(user_id)
            .await
            .map_err(Self::map_cart_error)?;
        let cart = match existing {
            Some(cart) => cart,
            None => match self
                .carts
                .create_cart_with_item(user_id, &request.product_variant_id, request.quantity)
                .await
            {
                Ok(record) => {
                    info!(%user_id, cart_id = %record.cart.id, "created cart");
                    return Ok(record);
                }
                Err(CartRepositoryError::DuplicateCart { .. }) => {
                    debug!(%user_id, "cart creation raced; re-reading existing cart");
                    self.carts
                        .find_cart_by_user(user_id)
                        .await
                        .map_err(Self::map_cart_error)?
                        .ok_or_else(|| {
                            Error::conflict("cart creation conflicted but no cart was found")
                        })?
                }
                Err(err) => return Err(Self::map_cart_error(err)),
            },
        };

        let item = self
            .carts
            .upsert_cart_item_quantity(&cart.id, &request.product_variant_id, request.quantity)
            .await
            .map_err(Self::map_cart_error)?;
        Ok(CartItemRecord { item, cart })
    }

    /// Resolve an item and check it belongs to `user_id`.
    ///
    /// Existence is checked before ownership so a missing item reports
    /// `NotFound` rather than `Unauthorized`.
    async fn owned_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
    ) -> Result<CartItemRecord, Error> {
        let Some(record) = self
            .carts
            .find_cart_item_by_id(item_id)
            .await
            .map_err(Self::map_cart_error)?
        else {
            return Err(Self::item_not_found(&item_id.to_string()));
        };

        if !record.cart.is_owned_by(user_id) {
            warn!(%user_id, cart_item_id = %item_id, "rejected mutation of foreign cart item");
            return Err(Error::unauthorized(
                "cart item does not belong to the current user",
            ));
        }

        Ok(record)
    }
}

#[async_trait]
impl<R, C> CartCommand for CartService<R, C>
where
    R: CartRepository,
    C: ProductVariantLookup,
{
    async fn add_to_cart(
        &self,
        user_id: Option<&UserId>,
        payload: AddToCartPayload,
    ) -> Result<(), Error> {
        let request = AddToCart::try_from(payload).map_err(Self::validation_error)?;
        let user_id = Self::require_user(user_id)?;

        let variant = self
            .catalogue
            .find_product_variant(&request.product_variant_id)
            .await
            .map_err(Self::map_lookup_error)?
            .ok_or_else(|| Self::variant_not_found(&request.product_variant_id.to_string()))?;

        let CartItemRecord { item, cart } = self.add_line(user_id, &request).await?;

        info!(
            %user_id,
            cart_id = %cart.id,
            cart_item_id = %item.id,
            product_variant_id = %variant.id,
            added = request.quantity.get(),
            quantity = item.quantity.get(),
            "added product variant to cart"
        );
        Ok(())
    }

    async fn decrease_cart_item_quantity(
        &self,
        user_id: Option<&UserId>,
        payload: CartItemPayload,
    ) -> Result<(), Error> {
        let item_id = CartItemId::try_from(payload).map_err(Self::validation_error)?;
        let user_id = Self::require_user(user_id)?;
        let record = self.owned_item(user_id, &item_id).await?;

        match self
            .carts
            .decrement_cart_item(&record.cart.id, &item_id)
            .await
            .map_err(Self::map_cart_error)?
        {
            DecrementOutcome::Decremented(item) => {
                info!(%user_id, cart_item_id = %item_id, quantity = item.quantity.get(), "decreased cart item");
            }
            DecrementOutcome::Removed => {
                info!(%user_id, cart_item_id = %item_id, "removed cart item at quantity one");
            }
            DecrementOutcome::Missing => {
                debug!(%user_id, cart_item_id = %item_id, "cart item removed concurrently");
            }
        }
        Ok(())
    }

    async fn remove_cart_item(
        &self,
        user_id: Option<&UserId>,
        payload: CartItemPayload,
    ) -> Result<(), Error> {
        let item_id = CartItemId::try_from(payload).map_err(Self::validation_error)?;
        let user_id = Self::require_user(user_id)?;
        let record = self.owned_item(user_id, &item_id).await?;

        let deleted = self
            .carts
            .delete_cart_item(&record.cart.id, &item_id)
            .await
            .map_err(Self::map_cart_error)?;

        if deleted {
            info!(%user_id, cart_item_id = %item_id, "removed cart item");
        } else {
            debug!(%user_id, cart_item_id = %item_id, "cart item already absent");
        }
        Ok(())
    }
}

#[async_trait]
impl<R, C> CartQuery for CartService<R, C>
where
    R: CartRepository,
    C: ProductVariantLookup,
{
    async fn fetch_cart(&self, user_id: Option<&UserId>) -> Result<CartSummary, Error> {
        let user_id = Self::require_user(user_id)?;
        let Some(cart) = self
            .carts
            .find_cart_by_user(user_id)
            .await
            .map_err(Self::map_cart_error)?
        else {
            return Ok(CartSummary::empty());
        };

        let items = self
            .carts
            .list_cart_items(&cart.id)
            .await
            .map_err(Self::map_cart_error)?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let variant = self
                .catalogue
                .find_product_variant(&item.product_variant_id)
                .await
                .map_err(Self::map_lookup_error)?;
            match variant {
                Some(variant) => lines.push(CartLine {
                    cart_item_id: item.id,
                    variant,
                    quantity: item.quantity,
                }),
                None => warn!(
                    cart_item_id = %item.id,
                    product_variant_id = %item.product_variant_id,
                    "cart item references a missing product variant; omitting line"
                ),
            }
        }

        Ok(CartSummary {
            cart_id: Some(cart.id),
            lines,
        })
    }
}

#[cfg(test)]
#[path = "cart_service_tests.rs"]
mod tests;
