//! PostgreSQL-backed `CartRepository` implementation using Diesel ORM.
//!
//! Quantity arithmetic is always expressed in SQL so concurrent requests
//! serialise on the row instead of racing a read-modify-write in the
//! application:
//!
//! - add: `INSERT ... ON CONFLICT (cart_id, product_variant_id) DO UPDATE
//!   SET quantity = cart_item.quantity + excluded.quantity`, guarded by a
//!   `WHERE` clause that refuses to exceed `i32::MAX`;
//! - decrement: the row is locked with `FOR UPDATE`, then either updated or
//!   deleted inside one transaction;
//! - first add: the cart and its first line are inserted in one transaction,
//!   so a failed line write leaves no empty cart behind.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::{
    Cart, CartId, CartItem, CartItemId, CartItemRecord, DecrementOutcome, ProductVariantId,
    Quantity, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{CartItemRow, CartRow, NewCartItemRow, NewCartRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cart, cart_item};

/// Diesel-backed implementation of the [`CartRepository`] port.
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CartRepositoryError {
    CartRepositoryError::connection(error.into_message())
}

/// Foreign key from `cart_item` to the catalogue, named in the migration.
const VARIANT_FOREIGN_KEY: &str = "cart_item_product_variant_id_fkey";

fn map_failure(failure: DieselFailure) -> CartRepositoryError {
    match failure {
        DieselFailure::Connection(message) => CartRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            CartRepositoryError::query("unique constraint violated")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            CartRepositoryError::query("referenced row missing")
        }
        DieselFailure::Query(message) => CartRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CartRepositoryError {
    map_failure(classify_diesel_error(error))
}

/// Map a failed line insert, recognising a variant deleted after lookup.
fn map_line_write_error(
    error: diesel::result::Error,
    product_variant_id: &ProductVariantId,
) -> CartRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::ForeignKeyViolation { constraint }
            if constraint.as_deref() == Some(VARIANT_FOREIGN_KEY) =>
        {
            CartRepositoryError::variant_not_found(product_variant_id.to_string())
        }
        failure => map_failure(failure),
    }
}

/// Failure raised inside a multi-statement transaction.
enum TxError {
    Diesel(diesel::result::Error),
    Port(CartRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn row_to_cart(row: CartRow) -> Result<Cart, CartRepositoryError> {
    let CartRow {
        id,
        user_id,
        shipping_address_id,
        created_at,
        updated_at,
    } = row;
    let user_id = UserId::new(user_id).map_err(|error| {
        tracing::warn!(cart_id = %id, %error, "stored cart owner is not a usable user id");
        CartRepositoryError::query("stored cart owner is invalid")
    })?;

    Ok(Cart {
        id: CartId::from_uuid(id),
        user_id,
        shipping_address_id,
        created_at,
        updated_at,
    })
}

/// Insert a cart for `user_id`; `None` when the user already has one.
async fn insert_cart_row(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
) -> QueryResult<Option<CartRow>> {
    diesel::insert_into(cart::table)
        .values(&NewCartRow {
            id: Uuid::new_v4(),
            user_id: user_id.as_str(),
        })
        .on_conflict(cart::user_id)
        .do_nothing()
        .returning(CartRow::as_returning())
        .get_result(conn)
        .await
        .optional()
}

fn row_to_item(row: CartItemRow) -> Result<CartItem, CartRepositoryError> {
    let quantity = Quantity::new(i64::from(row.quantity)).map_err(|_| {
        tracing::warn!(
            cart_item_id = %row.id,
            quantity = row.quantity,
            "stored cart item quantity outside the valid range"
        );
        CartRepositoryError::query("stored cart item quantity is invalid")
    })?;

    Ok(CartItem {
        id: CartItemId::from_uuid(row.id),
        cart_id: CartId::from_uuid(row.cart_id),
        product_variant_id: ProductVariantId::from_uuid(row.product_variant_id),
        quantity,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// What the locked decrement transaction observed.
enum DecrementRow {
    Updated(CartItemRow),
    Deleted,
    Absent,
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn find_cart_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CartRow> = cart::table
            .filter(cart::user_id.eq(user_id.as_str()))
            .select(CartRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_cart).transpose()
    }

    async fn create_cart(&self, user_id: &UserId) -> Result<Cart, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        insert_cart_row(&mut conn, user_id)
            .await
            .map_err(map_diesel_error)?
            .map(row_to_cart)
            .transpose()?
            .ok_or_else(|| CartRepositoryError::duplicate_cart(user_id.to_string()))
    }

    async fn create_cart_with_item(
        &self,
        user_id: &UserId,
        product_variant_id: &ProductVariantId,
        quantity: Quantity,
    ) -> Result<CartItemRecord, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = user_id.clone();
        let variant_uuid = *product_variant_id.as_uuid();

        let created = conn
            .transaction(|conn| {
                async move {
                    let Some(cart_row) = insert_cart_row(conn, &owner).await? else {
                        return Err(TxError::Port(CartRepositoryError::duplicate_cart(
                            owner.to_string(),
                        )));
                    };
                    let item_row = diesel::insert_into(cart_item::table)
                        .values(&NewCartItemRow {
                            id: Uuid::new_v4(),
                            cart_id: cart_row.id,
                            product_variant_id: variant_uuid,
                            quantity: quantity.get(),
                        })
                        .returning(CartItemRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok((cart_row, item_row))
                }
                .scope_boxed()
            })
            .await;

        let (cart_row, item_row) = created.map_err(|error| match error {
            TxError::Port(error) => error,
            TxError::Diesel(error) => map_line_write_error(error, product_variant_id),
        })?;

        Ok(CartItemRecord {
            cart: row_to_cart(cart_row)?,
            item: row_to_item(item_row)?,
        })
    }

    async fn find_cart_item(
        &self,
        cart_id: &CartId,
        product_variant_id: &ProductVariantId,
    ) -> Result<Option<CartItem>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CartItemRow> = cart_item::table
            .filter(cart_item::cart_id.eq(cart_id.as_uuid()))
            .filter(cart_item::product_variant_id.eq(product_variant_id.as_uuid()))
            .select(CartItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_item).transpose()
    }

    async fn find_cart_item_by_id(
        &self,
        item_id: &CartItemId,
    ) -> Result<Option<CartItemRecord>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(CartItemRow, CartRow)> = cart_item::table
            .inner_join(cart::table)
            .filter(cart_item::id.eq(item_id.as_uuid()))
            .select((CartItemRow::as_select(), CartRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|(item, owner)| {
            Ok(CartItemRecord {
                item: row_to_item(item)?,
                cart: row_to_cart(owner)?,
            })
        })
        .transpose()
    }

    async fn list_cart_items(&self, cart_id: &CartId) -> Result<Vec<CartItem>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CartItemRow> = cart_item::table
            .filter(cart_item::cart_id.eq(cart_id.as_uuid()))
            .order((cart_item::created_at.asc(), cart_item::id.asc()))
            .select(CartItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_item).collect()
    }

    async fn upsert_cart_item_quantity(
        &self,
        cart_id: &CartId,
        product_variant_id: &ProductVariantId,
        delta: Quantity,
    ) -> Result<CartItem, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCartItemRow {
            id: Uuid::new_v4(),
            cart_id: *cart_id.as_uuid(),
            product_variant_id: *product_variant_id.as_uuid(),
            quantity: delta.get(),
        };
        let ceiling = i32::MAX - delta.get();

        let row: Option<CartItemRow> = {
            use diesel::query_dsl::methods::FilterDsl;
            diesel::insert_into(cart_item::table)
                .values(&new_row)
                .on_conflict((cart_item::cart_id, cart_item::product_variant_id))
                .do_update()
                .set((
                    cart_item::quantity.eq(cart_item::quantity + excluded(cart_item::quantity)),
                    cart_item::updated_at.eq(now),
                ))
                .filter(cart_item::quantity.le(ceiling))
                .returning(CartItemRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|error| map_line_write_error(error, product_variant_id))?
        };

        if let Some(row) = row {
            return row_to_item(row);
        }

        // The conflict branch matched but the ceiling guard refused the update.
        let existing: Uuid = cart_item::table
            .filter(cart_item::cart_id.eq(cart_id.as_uuid()))
            .filter(cart_item::product_variant_id.eq(product_variant_id.as_uuid()))
            .select(cart_item::id)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Err(CartRepositoryError::quantity_overflow(existing.to_string()))
    }

    async fn set_cart_item_quantity(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CartItemRow> = diesel::update(
            cart_item::table
                .filter(cart_item::id.eq(item_id.as_uuid()))
                .filter(cart_item::cart_id.eq(cart_id.as_uuid())),
        )
        .set((
            cart_item::quantity.eq(quantity.get()),
            cart_item::updated_at.eq(now),
        ))
        .returning(CartItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_item)
            .transpose()?
            .ok_or_else(|| CartRepositoryError::item_not_found(item_id.to_string()))
    }

    async fn decrement_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<DecrementOutcome, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cart_uuid = *cart_id.as_uuid();
        let item_uuid = *item_id.as_uuid();

        let observed = conn
            .transaction(|conn| {
                async move {
                    let locked: Option<i32> = cart_item::table
                        .filter(cart_item::id.eq(item_uuid))
                        .filter(cart_item::cart_id.eq(cart_uuid))
                        .select(cart_item::quantity)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;

                    match locked {
                        None => Ok(DecrementRow::Absent),
                        Some(quantity) if quantity > 1 => {
                            let row = diesel::update(cart_item::table.find(item_uuid))
                                .set((
                                    cart_item::quantity.eq(cart_item::quantity - 1),
                                    cart_item::updated_at.eq(now),
                                ))
                                .returning(CartItemRow::as_returning())
                                .get_result(conn)
                                .await?;
                            Ok(DecrementRow::Updated(row))
                        }
                        Some(_) => {
                            diesel::delete(cart_item::table.find(item_uuid))
                                .execute(conn)
                                .await?;
                            Ok(DecrementRow::Deleted)
                        }
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(match observed {
            DecrementRow::Updated(row) => DecrementOutcome::Decremented(row_to_item(row)?),
            DecrementRow::Deleted => DecrementOutcome::Removed,
            DecrementRow::Absent => DecrementOutcome::Missing,
        })
    }

    async fn delete_cart_item(
        &self,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            cart_item::table
                .filter(cart_item::id.eq(item_id.as_uuid()))
                .filter(cart_item::cart_id.eq(cart_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
