//! In-process adapters for the cart and catalogue ports.
//!
//! Used by tests and by the server when no database is configured. State is
//! lost on restart.

mod cart_repository;
mod catalogue;

pub use cart_repository::InMemoryCartRepository;
pub use catalogue::InMemoryCatalogue;
