//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define the strongly typed cart model and the service enforcing
//! cart rules. Inbound adapters call the driving ports in [`ports`]; outbound
//! adapters implement the driven ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - UserId (alias to `user::UserId`): authenticated caller identity.
//! - Cart, CartItem, Quantity, CartSummary: cart aggregate and read model.
//! - CartService: implementation of the cart driving ports.

pub(crate) mod cart;
mod cart_service;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::cart::{
    Cart, CartId, CartItem, CartItemId, CartItemRecord, CartLine, CartSummary,
    CartValidationError, DecrementOutcome, ProductVariant, ProductVariantId, Quantity,
};
pub use self::cart_service::CartService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserValidationError};

