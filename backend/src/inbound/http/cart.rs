//! Cart HTTP handlers.
//!
//! ```text
//! GET    /api/v1/cart
//! POST   /api/v1/cart/items
//! POST   /api/v1/cart/items/{cartItemId}/decrease
//! DELETE /api/v1/cart/items/{cartItemId}
//! ```
//!
//! Handlers resolve the session identity and pass raw payloads through; the
//! cart service owns validation, ordering, and ownership rules.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AddToCartPayload, CartItemPayload};
use crate::domain::{CartLine, CartSummary, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for adding a product variant to the cart.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    /// Variant to add.
    #[schema(example = "9b2f5f0e-8f0c-4d59-9d0e-0a4f0d8f1c11")]
    pub product_variant_id: String,
    /// Units to add; at least one.
    #[schema(example = 1, minimum = 1)]
    pub quantity: i64,
}

impl From<AddToCartRequest> for AddToCartPayload {
    fn from(value: AddToCartRequest) -> Self {
        Self {
            product_variant_id: value.product_variant_id,
            quantity: value.quantity,
        }
    }
}

/// One priced cart line.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub cart_item_id: String,
    pub product_variant_id: String,
    pub product_name: String,
    pub variant_name: String,
    pub slug: String,
    pub color: String,
    pub image_url: String,
    pub unit_price_in_cents: i32,
    pub quantity: i32,
    pub line_total_in_cents: i64,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        let line_total_in_cents = line.total_in_cents();
        Self {
            cart_item_id: line.cart_item_id.to_string(),
            product_variant_id: line.variant.id.to_string(),
            product_name: line.variant.product_name,
            variant_name: line.variant.name,
            slug: line.variant.slug,
            color: line.variant.color,
            image_url: line.variant.image_url,
            unit_price_in_cents: line.variant.price_in_cents,
            quantity: line.quantity.get(),
            line_total_in_cents,
        }
    }
}

/// Priced snapshot of the caller's cart.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartSummaryResponse {
    /// Absent until the first item is added.
    pub cart_id: Option<String>,
    pub items: Vec<CartLineResponse>,
    pub total_quantity: i64,
    pub total_in_cents: i64,
}

impl From<CartSummary> for CartSummaryResponse {
    fn from(summary: CartSummary) -> Self {
        let total_quantity = summary.total_quantity();
        let total_in_cents = summary.total_in_cents();
        Self {
            cart_id: summary.cart_id.map(|id| id.to_string()),
            items: summary.lines.into_iter().map(CartLineResponse::from).collect(),
            total_quantity,
            total_in_cents,
        }
    }
}

fn item_payload(path: web::Path<String>) -> CartItemPayload {
    CartItemPayload {
        cart_item_id: path.into_inner(),
    }
}

/// Fetch the caller's cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart summary", body = CartSummaryResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cart"],
    operation_id = "getCart"
)]
#[get("/cart")]
pub async fn get_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.user_id()?;
    let summary = state.cart_query.fetch_cart(user_id.as_ref()).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, no-store"))
        .json(CartSummaryResponse::from(summary)))
}

/// Add units of a product variant to the caller's cart.
///
/// Repeated calls accumulate onto the same line.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 204, description = "Added"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Product variant not found", body = Error),
        (status = 409, description = "Conflict", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addToCart"
)]
#[post("/cart/items")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddToCartRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.user_id()?;
    state
        .cart
        .add_to_cart(user_id.as_ref(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove one unit from a cart line, deleting it at one.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items/{cartItemId}/decrease",
    params(("cartItemId" = String, Path, description = "Cart item identifier")),
    responses(
        (status = 204, description = "Decreased"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Cart item not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cart"],
    operation_id = "decreaseCartItemQuantity"
)]
#[post("/cart/items/{cart_item_id}/decrease")]
pub async fn decrease_cart_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.user_id()?;
    state
        .cart
        .decrease_cart_item_quantity(user_id.as_ref(), item_payload(path))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a cart line regardless of quantity.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{cartItemId}",
    params(("cartItemId" = String, Path, description = "Cart item identifier")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Cart item not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/items/{cart_item_id}")]
pub async fn remove_cart_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.user_id()?;
    state
        .cart
        .remove_cart_item(user_id.as_ref(), item_payload(path))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the cart routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_cart)
        .service(add_to_cart)
        .service(decrease_cart_item)
        .service(remove_cart_item);
}

#[cfg(test)]
#[path = "cart_tests.rs"]
mod tests;
