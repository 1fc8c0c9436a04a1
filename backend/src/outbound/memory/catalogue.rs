//! Fixed in-memory product catalogue.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ports::{ProductVariantLookup, ProductVariantLookupError};
use crate::domain::{ProductVariant, ProductVariantId};

/// Catalogue holding a fixed set of variants.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogue {
    variants: HashMap<ProductVariantId, ProductVariant>,
}

impl InMemoryCatalogue {
    /// Build a catalogue from `variants`. Later duplicates replace earlier ones.
    pub fn new(variants: impl IntoIterator<Item = ProductVariant>) -> Self {
        Self {
            variants: variants
                .into_iter()
                .map(|variant| (variant.id, variant))
                .collect(),
        }
    }

    /// Number of variants on offer.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[async_trait]
impl ProductVariantLookup for InMemoryCatalogue {
    async fn find_product_variant(
        &self,
        id: &ProductVariantId,
    ) -> Result<Option<ProductVariant>, ProductVariantLookupError> {
        Ok(self.variants.get(id).cloned())
    }
}
