//! Port for cart and cart-item persistence.
//!
//! The [`CartRepository`] trait owns the persistent cart rows. Every method
//! is a single atomic unit against the store: quantity arithmetic happens
//! inside the store (`quantity = quantity + delta`) rather than as a
//! client-side read-then-write, so concurrent mutations never lose updates.

use async_trait::async_trait;

use crate::domain::{
    Cart, CartId, CartItem, CartItemId, CartItemRecord, DecrementOutcome, ProductVariantId,
    Quantity, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by cart repository adapters.
    pub enum CartRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "cart repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "cart repository query failed: {message}",
        /// A cart already exists for this user.
        DuplicateCart { user_id: String } =>
            "a cart already exists for user {user_id}",
        /// The addressed cart item does not exist.
        ItemNotFound { item_id: String } =>
            "cart item {item_id} not found",
        /// Adding the delta would exceed the storable quantity.
        QuantityOverflow { item_id: String } =>
            "quantity for cart item {item_id} would overflow",
        /// The referenced product variant disappeared before the write.
        VariantNotFound { product_variant_id: String } =>
            "product variant {product_variant_id} no longer exists",
    }
}

/// Port for cart storage.
///
/// # Ownership
///
/// Item-level writes take the owning [`CartId`] alongside the item id and
/// only touch rows in that cart, so an adapter can never modify another
/// user's line item even when handed a foreign item id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Fetch the cart owned by `user_id`, if any.
    async fn find_cart_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, CartRepositoryError>;

    /// Create an empty cart for `user_id`.
    ///
    /// Fails with [`CartRepositoryError::DuplicateCart`] when the user
    /// already owns a cart; callers recover by re-reading.
    async fn create_cart(&self, user_id: &UserId) -> Result<Cart, CartRepositoryError>;

    /// Create the cart for `user_id` holding a single line.
    ///
    /// The cart and its first line commit together: if the line cannot be
    /// written, no cart is left behind. Fails with
    /// [`CartRepositoryError::DuplicateCart`] when the user already owns a
    /// cart, and with [`CartRepositoryError::VariantNotFound`] when the
    /// variant no longer exists.
    async fn create_cart_with_item(
        &self,
        user_id: &UserId,
        product_variant_id: &ProductVariantId,
        quantity: Quantity,
    ) -> Result<CartItemRecord, CartRepositoryError>;

    /// Fetch the line for `(cart_id, product_variant_id)`.
    async fn find_cart_item(
        &self,
        cart_id: &CartId,
        product_variant_id: &ProductVariantId,
    ) -> Result<Option<CartItem>, CartRepositoryError>;

    /// Fetch a line by id together with its owning cart.
    async fn find_cart_item_by_id(
        &self,
        item_id: &CartItemId,
    ) -> Result<Option<CartItemRecord>, CartRepositoryError>;

    /// List every line in a cart, oldest first.
    async fn list_cart_items(&self, cart_id: &CartId) -> Result<Vec<CartItem>, CartRepositoryError>;

    /// Insert the line with `delta` or add `delta` to the stored quantity.
    ///
    /// Fails with [`CartRepositoryError::QuantityOverflow`], naming the
    /// existing line, when the sum exceeds the storable quantity.
    async fn upsert_cart_item_quantity(
        &self,
        cart_id: &CartId,
        product_variant_id: &ProductVariantId,
        delta: Quantity,
    ) -> Result<CartItem, CartRepositoryError>;

    /// Overwrite a line's quantity.
    ///
    /// Fails with [`CartRepositoryError::ItemNotFound`] when the line is not
    /// present in `cart_id`.
    async fn set_cart_item_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartRepositoryError>;

    /// Subtract one from a line, deleting it when the quantity is one.
    async fn decrement_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<DecrementOutcome, CartRepositoryError>;

    /// Delete a line. Returns `false` when it was already absent.
    async fn delete_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<bool, CartRepositoryError>;
}
