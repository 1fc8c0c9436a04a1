//! Storefront shopping-cart backend.
//!
//! The domain owns cart rules behind driving ports; inbound HTTP handlers and
//! outbound persistence adapters plug into those ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
