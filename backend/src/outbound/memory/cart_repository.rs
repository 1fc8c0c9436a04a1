//! Mutex-guarded in-memory cart repository.
//!
//! Every port method takes the lock once and completes its read-modify-write
//! before releasing it, which gives the same atomicity the SQL adapter gets
//! from single statements and row locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::{
    Cart, CartId, CartItem, CartItemId, CartItemRecord, DecrementOutcome, ProductVariantId,
    Quantity, UserId,
};

#[derive(Default)]
struct Store {
    carts: HashMap<CartId, Cart>,
    cart_by_user: HashMap<UserId, CartId>,
    // Lines per cart, in insertion order.
    items: HashMap<CartId, Vec<CartItem>>,
}

impl Store {
    fn insert_cart(&mut self, user_id: &UserId, now: DateTime<Utc>) -> Result<Cart, CartRepositoryError> {
        if self.cart_by_user.contains_key(user_id) {
            return Err(CartRepositoryError::duplicate_cart(user_id.to_string()));
        }

        let cart = Cart {
            id: CartId::random(),
            user_id: user_id.clone(),
            shipping_address_id: None,
            created_at: now,
            updated_at: now,
        };
        self.cart_by_user.insert(user_id.clone(), cart.id);
        self.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    fn item_mut(&mut self, cart_id: &CartId, item_id: &CartItemId) -> Option<&mut CartItem> {
        self.items
            .get_mut(cart_id)?
            .iter_mut()
            .find(|item| &item.id == item_id)
    }

    fn remove_item(&mut self, cart_id: &CartId, item_id: &CartItemId) -> bool {
        let Some(lines) = self.items.get_mut(cart_id) else {
            return false;
        };
        let before = lines.len();
        lines.retain(|item| &item.id != item_id);
        lines.len() != before
    }
}

/// In-memory [`CartRepository`].
#[derive(Clone)]
pub struct InMemoryCartRepository {
    store: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCartRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryCartRepository {
    /// Create an empty repository stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, CartRepositoryError> {
        self.store
            .lock()
            .map_err(|_| CartRepositoryError::query("in-memory cart store poisoned"))
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn find_cart_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, CartRepositoryError> {
        let store = self.lock()?;
        Ok(store
            .cart_by_user
            .get(user_id)
            .and_then(|cart_id| store.carts.get(cart_id))
            .cloned())
    }

    async fn create_cart(&self, user_id: &UserId) -> Result<Cart, CartRepositoryError> {
        let now = self.clock.utc();
        self.lock()?.insert_cart(user_id, now)
    }

    async fn create_cart_with_item(
        &self,
        user_id: &UserId,
        product_variant_id: &ProductVariantId,
        quantity: Quantity,
    ) -> Result<CartItemRecord, CartRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        let cart = store.insert_cart(user_id, now)?;
        let item = CartItem {
            id: CartItemId::random(),
            cart_id: cart.id,
            product_variant_id: *product_variant_id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        store.items.insert(cart.id, vec![item.clone()]);
        Ok(CartItemRecord { item, cart })
    }

    async fn find_cart_item(
        &self,
        cart_id: &CartId,
        product_variant_id: &ProductVariantId,
    ) -> Result<Option<CartItem>, CartRepositoryError> {
        let store = self.lock()?;
        Ok(store.items.get(cart_id).and_then(|lines| {
            lines
                .iter()
                .find(|item| &item.product_variant_id == product_variant_id)
                .cloned()
        }))
    }

    async fn find_cart_item_by_id(
        &self,
        item_id: &CartItemId,
    ) -> Result<Option<CartItemRecord>, CartRepositoryError> {
        let store = self.lock()?;
        let item = store
            .items
            .values()
            .flatten()
            .find(|item| &item.id == item_id)
            .cloned();

        Ok(item.and_then(|item| {
            store.carts.get(&item.cart_id).cloned().map(|cart| CartItemRecord { item, cart })
        }))
    }

    async fn list_cart_items(&self, cart_id: &CartId) -> Result<Vec<CartItem>, CartRepositoryError> {
        let store = self.lock()?;
        Ok(store.items.get(cart_id).cloned().unwrap_or_default())
    }

    async fn upsert_cart_item_quantity(
        &self,
        cart_id: &CartId,
        product_variant_id: &ProductVariantId,
        delta: Quantity,
    ) -> Result<CartItem, CartRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        if !store.carts.contains_key(cart_id) {
            return Err(CartRepositoryError::query("cart does not exist"));
        }

        let lines = store.items.entry(*cart_id).or_default();
        if let Some(item) = lines
            .iter_mut()
            .find(|item| &item.product_variant_id == product_variant_id)
        {
            item.quantity = item
                .quantity
                .checked_add(delta)
                .ok_or_else(|| CartRepositoryError::quantity_overflow(item.id.to_string()))?;
            item.updated_at = now;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: CartItemId::random(),
            cart_id: *cart_id,
            product_variant_id: *product_variant_id,
            quantity: delta,
            created_at: now,
            updated_at: now,
        };
        lines.push(item.clone());
        Ok(item)
    }

    async fn set_cart_item_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        let item = store
            .item_mut(cart_id, item_id)
            .ok_or_else(|| CartRepositoryError::item_not_found(item_id.to_string()))?;
        item.quantity = quantity;
        item.updated_at = now;
        Ok(item.clone())
    }

    async fn decrement_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<DecrementOutcome, CartRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        let Some(item) = store.item_mut(cart_id, item_id) else {
            return Ok(DecrementOutcome::Missing);
        };

        match item.quantity.decremented() {
            Some(quantity) => {
                item.quantity = quantity;
                item.updated_at = now;
                Ok(DecrementOutcome::Decremented(item.clone()))
            }
            None => {
                store.remove_item(cart_id, item_id);
                Ok(DecrementOutcome::Removed)
            }
        }
    }

    async fn delete_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<bool, CartRepositoryError> {
        let mut store = self.lock()?;
        Ok(store.remove_item(cart_id, item_id))
    }
}
