//! Tests for cart HTTP handlers.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::domain::{CartService, ErrorCode, ProductVariant, ProductVariantId, UserId};
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::session::SessionContext;
use crate::outbound::memory::{InMemoryCartRepository, InMemoryCatalogue};

const VARIANT_ID: &str = "9b2f5f0e-8f0c-4d59-9d0e-0a4f0d8f1c11";

#[fixture]
fn variant() -> ProductVariant {
    ProductVariant {
        id: ProductVariantId::from_uuid(Uuid::parse_str(VARIANT_ID).expect("fixture uuid")),
        product_id: Uuid::new_v4(),
        product_name: "Trail Runner".to_owned(),
        name: "Trail Runner Green".to_owned(),
        slug: "trail-runner-green".to_owned(),
        color: "green".to_owned(),
        price_in_cents: 1_999,
        image_url: "https://cdn.example.com/trail-runner-green.png".to_owned(),
    }
}

async fn sign_in(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

fn test_app(
    variant: ProductVariant,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let service = CartService::new(
        Arc::new(InMemoryCartRepository::default()),
        Arc::new(InMemoryCatalogue::new([variant])),
    );
    App::new()
        .app_data(web::Data::new(HttpState::from_service(Arc::new(service))))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(crate::inbound::http::test_utils::test_session_middleware())
        .route("/test/sign-in/{user_id}", web::post().to(sign_in))
        .service(web::scope("/api/v1").configure(configure))
}

async fn sign_in_as<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/test/sign-in/{user_id}"))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

fn add_request(cookie: &Cookie<'static>, variant_id: &str, quantity: i64) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/api/v1/cart/items")
        .cookie(cookie.clone())
        .set_json(json!({ "productVariantId": variant_id, "quantity": quantity }))
        .to_request()
}

fn get_request(cookie: &Cookie<'static>) -> actix_http::Request {
    actix_test::TestRequest::get()
        .uri("/api/v1/cart")
        .cookie(cookie.clone())
        .to_request()
}

#[rstest]
#[actix_web::test]
async fn anonymous_requests_are_unauthorised(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;

    let get = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/cart").to_request(),
    )
    .await;
    let add = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .set_json(json!({ "productVariantId": VARIANT_ID, "quantity": 1 }))
            .to_request(),
    )
    .await;

    assert_eq!(get.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(add.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn repeated_adds_accumulate_on_one_line(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;

    for quantity in [2, 3] {
        let response = actix_test::call_service(&app, add_request(&cookie, VARIANT_ID, quantity)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = actix_test::call_service(&app, get_request(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: CartSummaryResponse = actix_test::read_body_json(response).await;

    assert!(summary.cart_id.is_some());
    assert_eq!(summary.items.len(), 1);
    assert_eq!(summary.items[0].quantity, 5);
    assert_eq!(summary.items[0].product_variant_id, VARIANT_ID);
    assert_eq!(summary.total_quantity, 5);
    assert_eq!(summary.total_in_cents, 9_995);
}

#[rstest]
#[actix_web::test]
async fn fresh_user_sees_empty_cart(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;

    let summary: CartSummaryResponse =
        actix_test::call_and_read_body_json(&app, get_request(&cookie)).await;

    assert!(summary.cart_id.is_none());
    assert!(summary.items.is_empty());
    assert_eq!(summary.total_in_cents, 0);
}

#[rstest]
#[case(json!({ "productVariantId": VARIANT_ID, "quantity": 0 }), "quantity")]
#[case(json!({ "productVariantId": VARIANT_ID, "quantity": -4 }), "quantity")]
#[case(json!({ "productVariantId": "sku-123", "quantity": 1 }), "productVariantId")]
#[actix_web::test]
async fn invalid_add_payloads_are_rejected(
    variant: ProductVariant,
    #[case] body: serde_json::Value,
    #[case] field: &str,
) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Error = actix_test::read_body_json(response).await;
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().map(|d| d["field"].clone()), Some(json!(field)));

    let summary: CartSummaryResponse =
        actix_test::call_and_read_body_json(&app, get_request(&cookie)).await;
    assert!(summary.cart_id.is_none(), "rejected adds must not create a cart");
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_bad_request(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/cart/items")
            .cookie(cookie)
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"productVariantId\":")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn unknown_variant_is_not_found(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        add_request(&cookie, &Uuid::new_v4().to_string(), 1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn only_item_id<S>(app: &S, cookie: &Cookie<'static>) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let summary: CartSummaryResponse =
        actix_test::call_and_read_body_json(app, get_request(cookie)).await;
    assert_eq!(summary.items.len(), 1);
    summary.items[0].cart_item_id.clone()
}

#[rstest]
#[actix_web::test]
async fn decrease_steps_down_then_removes(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;
    actix_test::call_service(&app, add_request(&cookie, VARIANT_ID, 2)).await;
    let item_id = only_item_id(&app, &cookie).await;

    let decrease = || {
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/cart/items/{item_id}/decrease"))
            .cookie(cookie.clone())
            .to_request()
    };

    assert_eq!(
        actix_test::call_service(&app, decrease()).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(only_item_id(&app, &cookie).await, item_id);
    assert_eq!(
        actix_test::call_service(&app, decrease()).await.status(),
        StatusCode::NO_CONTENT
    );

    let summary: CartSummaryResponse =
        actix_test::call_and_read_body_json(&app, get_request(&cookie)).await;
    assert!(summary.items.is_empty());
    assert_eq!(
        actix_test::call_service(&app, decrease()).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[rstest]
#[actix_web::test]
async fn remove_deletes_line_and_second_remove_is_not_found(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;
    actix_test::call_service(&app, add_request(&cookie, VARIANT_ID, 7)).await;
    let item_id = only_item_id(&app, &cookie).await;

    let remove = || {
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/cart/items/{item_id}"))
            .cookie(cookie.clone())
            .to_request()
    };

    assert_eq!(
        actix_test::call_service(&app, remove()).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        actix_test::call_service(&app, remove()).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[rstest]
#[actix_web::test]
async fn foreign_items_cannot_be_touched(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let owner = sign_in_as(&app, &UserId::random()).await;
    let intruder = sign_in_as(&app, &UserId::random()).await;
    actix_test::call_service(&app, add_request(&owner, VARIANT_ID, 3)).await;
    let item_id = only_item_id(&app, &owner).await;

    let decrease = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/cart/items/{item_id}/decrease"))
            .cookie(intruder.clone())
            .to_request(),
    )
    .await;
    let remove = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/cart/items/{item_id}"))
            .cookie(intruder)
            .to_request(),
    )
    .await;

    assert_eq!(decrease.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(remove.status(), StatusCode::UNAUTHORIZED);
    let summary: CartSummaryResponse =
        actix_test::call_and_read_body_json(&app, get_request(&owner)).await;
    assert_eq!(summary.items[0].quantity, 3);
}

#[rstest]
#[actix_web::test]
async fn malformed_item_id_is_a_bad_request(variant: ProductVariant) {
    let app = actix_test::init_service(test_app(variant)).await;
    let cookie = sign_in_as(&app, &UserId::random()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/cart/items/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
