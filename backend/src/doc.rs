//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the cart and health endpoints, the request and
//! response bodies they exchange, and the session cookie security scheme.
//! The document backs Swagger UI in debug builds and is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::cart::{AddToCartRequest, CartLineResponse, CartSummaryResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie carrying the signed-in user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront cart API",
        description = "Session-authenticated shopping cart mutations and health checks.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::cart::get_cart,
        crate::inbound::http::cart::add_to_cart,
        crate::inbound::http::cart::decrease_cart_item,
        crate::inbound::http::cart::remove_cart_item,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AddToCartRequest,
        CartLineResponse,
        CartSummaryResponse,
        Error,
        ErrorCode
    )),
    tags(
        (name = "cart", description = "Operations on the signed-in user's cart"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered OpenAPI surface.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/cart")]
    #[case("/api/v1/cart/items")]
    #[case("/api/v1/cart/items/{cartItemId}/decrease")]
    #[case("/api/v1/cart/items/{cartItemId}")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn documents_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn summary_schema_exposes_totals() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let summary = schemas
            .get("CartSummaryResponse")
            .expect("CartSummaryResponse schema");

        assert_object_schema_has_field(summary, "items");
        assert_object_schema_has_field(summary, "totalQuantity");
        assert_object_schema_has_field(summary, "totalInCents");
    }

    #[rstest]
    fn registers_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
