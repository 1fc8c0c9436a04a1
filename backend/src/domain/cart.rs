//! Cart aggregate: carts, line items, quantities, and the cart read model.
//!
//! A cart belongs to exactly one user and owns its line items. Each line item
//! binds one product variant to a quantity of at least one; a line that would
//! drop to zero is deleted instead.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_uuid_id! {
    /// Identifier of a cart row.
    CartId
}

define_uuid_id! {
    /// Identifier of a cart line item.
    CartItemId
}

define_uuid_id! {
    /// Identifier of a purchasable product variant.
    ProductVariantId
}

/// Validation failures for cart payload fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartValidationError {
    #[error("{field} must be a valid UUID")]
    InvalidIdentifier { field: &'static str },
    #[error("quantity must be at least {min}")]
    QuantityTooSmall { min: i64 },
    #[error("quantity must be at most {max}")]
    QuantityTooLarge { max: i64 },
}

impl CartValidationError {
    /// Stable machine-readable code for adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_uuid",
            Self::QuantityTooSmall { .. } => "quantity_too_small",
            Self::QuantityTooLarge { .. } => "quantity_too_large",
        }
    }

    /// Name of the payload field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { field } => field,
            Self::QuantityTooSmall { .. } | Self::QuantityTooLarge { .. } => "quantity",
        }
    }
}

pub(crate) fn parse_identifier(raw: &str, field: &'static str) -> Result<Uuid, CartValidationError> {
    if raw.trim() != raw {
        return Err(CartValidationError::InvalidIdentifier { field });
    }
    Uuid::parse_str(raw).map_err(|_| CartValidationError::InvalidIdentifier { field })
}

/// Line item quantity.
///
/// ## Invariants
/// - Always within `1..=Quantity::MAX`, matching the `integer` storage column.
///
/// # Examples
/// ```
/// use storefront::domain::Quantity;
///
/// let qty = Quantity::new(3).expect("valid quantity");
/// assert_eq!(qty.get(), 3);
/// assert!(Quantity::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i32);

impl Quantity {
    /// Smallest quantity a stored line item may hold.
    pub const ONE: Self = Self(1);
    /// Largest representable quantity.
    pub const MAX: i64 = i32::MAX as i64;

    /// Validate a raw quantity.
    pub fn new(value: i64) -> Result<Self, CartValidationError> {
        if value < 1 {
            return Err(CartValidationError::QuantityTooSmall { min: 1 });
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| CartValidationError::QuantityTooLarge { max: Self::MAX })
    }

    /// Raw quantity value.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Add `delta`, returning `None` when the sum leaves the valid range.
    pub fn checked_add(self, delta: Quantity) -> Option<Quantity> {
        self.0.checked_add(delta.0).map(Self)
    }

    /// Subtract one, returning `None` when the result would be zero.
    pub fn decremented(self) -> Option<Quantity> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = CartValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A user's cart. At most one exists per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub shipping_address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Whether the cart belongs to `user_id`.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// One line of a cart: a product variant and how many of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_variant_id: ProductVariantId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart item together with the cart that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRecord {
    pub item: CartItem,
    pub cart: Cart,
}

/// Result of an atomic single-unit decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Quantity dropped by one and the line is still present.
    Decremented(CartItem),
    /// Quantity was one, so the line was deleted.
    Removed,
    /// No such line exists in the given cart.
    Missing,
}

/// Read-only catalogue entry for a purchasable variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductVariant {
    pub id: ProductVariantId,
    pub product_id: Uuid,
    pub product_name: String,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub price_in_cents: i32,
    pub image_url: String,
}

/// One priced line of the cart read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub cart_item_id: CartItemId,
    pub variant: ProductVariant,
    pub quantity: Quantity,
}

impl CartLine {
    /// Unit price multiplied by quantity.
    pub fn total_in_cents(&self) -> i64 {
        i64::from(self.variant.price_in_cents) * i64::from(self.quantity)
    }
}

/// Priced snapshot of a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub cart_id: Option<CartId>,
    pub lines: Vec<CartLine>,
}

impl CartSummary {
    /// Summary for a user who has never added anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Sum of all line totals.
    pub fn total_in_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::total_in_cents).sum()
    }

    /// Whether the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
