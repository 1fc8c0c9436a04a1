//! HTTP inbound adapter exposing the cart REST endpoints.

pub mod cart;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
