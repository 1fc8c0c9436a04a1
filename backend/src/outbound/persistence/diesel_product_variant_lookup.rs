//! PostgreSQL-backed catalogue lookup.
//!
//! Reads `product_variant` joined to its `product` so cart lines can show the
//! product name next to the variant.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProductVariantLookup, ProductVariantLookupError};
use crate::domain::{ProductVariant, ProductVariantId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{ProductNameRow, ProductVariantRow};
use super::pool::{DbPool, PoolError};
use super::schema::{product, product_variant};

/// Diesel-backed implementation of the [`ProductVariantLookup`] port.
#[derive(Clone)]
pub struct DieselProductVariantLookup {
    pool: DbPool,
}

impl DieselProductVariantLookup {
    /// Create a new lookup with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductVariantLookupError {
    ProductVariantLookupError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> ProductVariantLookupError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => ProductVariantLookupError::connection(message),
        DieselFailure::UniqueViolation { .. } | DieselFailure::ForeignKeyViolation { .. } => {
            ProductVariantLookupError::query("unexpected constraint violation")
        }
        DieselFailure::Query(message) => ProductVariantLookupError::query(message),
    }
}

fn rows_to_variant(variant: ProductVariantRow, product: ProductNameRow) -> ProductVariant {
    ProductVariant {
        id: ProductVariantId::from_uuid(variant.id),
        product_id: variant.product_id,
        product_name: product.name,
        name: variant.name,
        slug: variant.slug,
        color: variant.color,
        price_in_cents: variant.price_in_cents,
        image_url: variant.image_url,
    }
}

#[async_trait]
impl ProductVariantLookup for DieselProductVariantLookup {
    async fn find_product_variant(
        &self,
        id: &ProductVariantId,
    ) -> Result<Option<ProductVariant>, ProductVariantLookupError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(ProductVariantRow, ProductNameRow)> = product_variant::table
            .inner_join(product::table)
            .filter(product_variant::id.eq(id.as_uuid()))
            .select((ProductVariantRow::as_select(), ProductNameRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|(variant, product)| rows_to_variant(variant, product)))
    }
}
