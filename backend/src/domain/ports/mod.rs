//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`CartCommand`], [`CartQuery`]) are implemented by the
//! cart service. Driven ports ([`CartRepository`], [`ProductVariantLookup`])
//! are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod cart_command;
mod cart_repository;
mod product_variant_lookup;

pub use cart_command::{AddToCart, AddToCartPayload, CartCommand, CartItemPayload, CartQuery};
#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use cart_repository::{CartRepository, CartRepositoryError};
#[cfg(test)]
pub use product_variant_lookup::MockProductVariantLookup;
pub use product_variant_lookup::{ProductVariantLookup, ProductVariantLookupError};
