//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the cart and catalogue ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel rows and domain types. Ownership and validation rules live in the
//!   domain service.
//! - **Internal models**: Row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Server-side arithmetic**: quantity changes are single SQL statements
//!   or row-locked transactions.
//!
//! # Example
//!
//! ```no_run
//! use storefront::outbound::persistence::{DbPool, DieselCartRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/storefront")).await?;
//! let carts = DieselCartRepository::new(pool);
//! # let _ = carts;
//! # Ok(())
//! # }
//! ```

mod diesel_cart_repository;
mod diesel_error_mapping;
mod diesel_product_variant_lookup;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_product_variant_lookup::DieselProductVariantLookup;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
