//! Port for read-only product variant lookups.
//!
//! The catalogue is owned elsewhere; the cart only needs to confirm a variant
//! exists before adding it and to price lines for the cart summary.

use async_trait::async_trait;

use crate::domain::{ProductVariant, ProductVariantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue lookup adapters.
    pub enum ProductVariantLookupError {
        /// Catalogue connection could not be established.
        Connection { message: String } =>
            "catalogue connection failed: {message}",
        /// Lookup query failed during execution.
        Query { message: String } =>
            "catalogue query failed: {message}",
    }
}

/// Port resolving product variant identifiers to catalogue entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductVariantLookup: Send + Sync {
    /// Fetch a variant by id. Returns `None` when it does not exist.
    async fn find_product_variant(
        &self,
        id: &ProductVariantId,
    ) -> Result<Option<ProductVariant>, ProductVariantLookupError>;
}
