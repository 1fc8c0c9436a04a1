//! Behavioural properties of cart mutations over the in-memory adapters.
//!
//! These drive the public cart ports the way an inbound adapter would and
//! inspect the repository directly to check persisted state.

use std::sync::Arc;

use rstest::{fixture, rstest};
use uuid::Uuid;

use storefront::domain::ports::{
    AddToCartPayload, CartCommand, CartItemPayload, CartQuery, CartRepository,
};
use storefront::domain::{
    CartItem, CartService, ErrorCode, ProductVariant, ProductVariantId, UserId,
};
use storefront::outbound::memory::{InMemoryCartRepository, InMemoryCatalogue};

const VARIANT_A: Uuid = Uuid::from_u128(0xa);
const VARIANT_B: Uuid = Uuid::from_u128(0xb);

type Service = CartService<InMemoryCartRepository, InMemoryCatalogue>;

struct Harness {
    service: Arc<Service>,
    carts: Arc<InMemoryCartRepository>,
}

impl Harness {
    async fn add(&self, user: &UserId, variant: Uuid, quantity: i64) {
        self.service
            .add_to_cart(
                Some(user),
                AddToCartPayload {
                    product_variant_id: variant.to_string(),
                    quantity,
                },
            )
            .await
            .expect("add to cart");
    }

    async fn items(&self, user: &UserId) -> Vec<CartItem> {
        let cart = self
            .carts
            .find_cart_by_user(user)
            .await
            .expect("cart lookup")
            .expect("cart exists");
        self.carts
            .list_cart_items(&cart.id)
            .await
            .expect("list items")
    }

    async fn item_for(&self, user: &UserId, variant: Uuid) -> Option<CartItem> {
        self.items(user)
            .await
            .into_iter()
            .find(|item| item.product_variant_id == ProductVariantId::from_uuid(variant))
    }
}

fn payload(item: &CartItem) -> CartItemPayload {
    CartItemPayload {
        cart_item_id: item.id.to_string(),
    }
}

fn variant(id: Uuid, price_in_cents: i32) -> ProductVariant {
    ProductVariant {
        id: ProductVariantId::from_uuid(id),
        product_id: Uuid::from_u128(1),
        product_name: "Field notebook".to_owned(),
        name: format!("Variant {id}"),
        slug: format!("field-notebook-{id}"),
        color: "#222222".to_owned(),
        price_in_cents,
        image_url: "/images/notebook.jpg".to_owned(),
    }
}

#[fixture]
fn harness() -> Harness {
    let carts = Arc::new(InMemoryCartRepository::default());
    let catalogue = Arc::new(InMemoryCatalogue::new([
        variant(VARIANT_A, 500),
        variant(VARIANT_B, 1200),
    ]));
    Harness {
        service: Arc::new(CartService::new(carts.clone(), catalogue)),
        carts,
    }
}

#[rstest]
#[tokio::test]
async fn removing_twice_reports_not_found_and_spares_other_lines(harness: Harness) {
    let user = UserId::random();
    harness.add(&user, VARIANT_A, 1).await;
    harness.add(&user, VARIANT_B, 4).await;
    let target = harness.item_for(&user, VARIANT_A).await.expect("line A");

    harness
        .service
        .remove_cart_item(Some(&user), payload(&target))
        .await
        .expect("first removal");
    let second = harness
        .service
        .remove_cart_item(Some(&user), payload(&target))
        .await
        .expect_err("second removal");

    assert_eq!(second.code(), ErrorCode::NotFound);
    let remaining = harness.items(&user).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(
        remaining.first().map(|item| item.quantity.get()),
        Some(4)
    );
}

#[rstest]
#[tokio::test]
async fn repeated_adds_accumulate_on_one_line(harness: Harness) {
    let user = UserId::random();
    harness.add(&user, VARIANT_A, 2).await;
    harness.add(&user, VARIANT_A, 3).await;

    let items = harness.items(&user).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().map(|item| item.quantity.get()), Some(5));

    let summary = harness
        .service
        .fetch_cart(Some(&user))
        .await
        .expect("fetch cart");
    assert_eq!(summary.total_quantity(), 5);
    assert_eq!(summary.total_in_cents(), 2500);
}

#[rstest]
#[case::deletes_single_unit(1, None)]
#[case::drops_one_unit(3, Some(2))]
#[tokio::test]
async fn decrease_removes_one_unit(
    harness: Harness,
    #[case] start: i64,
    #[case] expected: Option<i32>,
) {
    let user = UserId::random();
    harness.add(&user, VARIANT_A, start).await;
    let line = harness.item_for(&user, VARIANT_A).await.expect("line");

    harness
        .service
        .decrease_cart_item_quantity(Some(&user), payload(&line))
        .await
        .expect("decrease");

    let after = harness.item_for(&user, VARIANT_A).await;
    assert_eq!(after.map(|item| item.quantity.get()), expected);
}

#[rstest]
#[tokio::test]
async fn foreign_items_cannot_be_touched(harness: Harness) {
    let owner = UserId::random();
    let intruder = UserId::random();
    harness.add(&owner, VARIANT_B, 2).await;
    harness.add(&intruder, VARIANT_A, 1).await;
    let line = harness.item_for(&owner, VARIANT_B).await.expect("owner line");

    let decrease = harness
        .service
        .decrease_cart_item_quantity(Some(&intruder), payload(&line))
        .await
        .expect_err("foreign decrease");
    let remove = harness
        .service
        .remove_cart_item(Some(&intruder), payload(&line))
        .await
        .expect_err("foreign remove");

    assert_eq!(decrease.code(), ErrorCode::Unauthorized);
    assert_eq!(remove.code(), ErrorCode::Unauthorized);
    let untouched = harness.item_for(&owner, VARIANT_B).await.expect("owner line");
    assert_eq!(untouched.quantity.get(), 2);
}

#[rstest]
#[tokio::test]
async fn first_add_creates_the_cart_and_later_adds_reuse_it(harness: Harness) {
    let user = UserId::random();
    assert!(
        harness
            .carts
            .find_cart_by_user(&user)
            .await
            .expect("cart lookup")
            .is_none()
    );

    harness.add(&user, VARIANT_A, 1).await;
    let first = harness
        .carts
        .find_cart_by_user(&user)
        .await
        .expect("cart lookup")
        .expect("cart created");
    harness.add(&user, VARIANT_B, 1).await;
    let second = harness
        .carts
        .find_cart_by_user(&user)
        .await
        .expect("cart lookup")
        .expect("cart kept");

    assert_eq!(first.id, second.id);
    assert!(harness.items(&user).await.iter().all(|item| item.cart_id == first.id));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_lose_no_updates(harness: Harness) {
    const CALLERS: usize = 32;
    let user = UserId::random();

    let tasks: Vec<_> = (0..CALLERS)
        .map(|_| {
            let service = harness.service.clone();
            let user = user.clone();
            tokio::spawn(async move {
                service
                    .add_to_cart(
                        Some(&user),
                        AddToCartPayload {
                            product_variant_id: VARIANT_A.to_string(),
                            quantity: 1,
                        },
                    )
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("task joined").expect("concurrent add");
    }

    let items = harness.items(&user).await;
    assert_eq!(items.len(), 1);
    assert_eq!(
        items.first().map(|item| i64::from(item.quantity.get())),
        Some(CALLERS as i64)
    );
    let summary = harness
        .service
        .fetch_cart(Some(&user))
        .await
        .expect("fetch cart");
    assert_eq!(summary.total_quantity(), CALLERS as i64);
}

#[rstest]
#[tokio::test]
async fn anonymous_callers_are_rejected_without_side_effects(harness: Harness) {
    let err = harness
        .service
        .add_to_cart(
            None,
            AddToCartPayload {
                product_variant_id: VARIANT_A.to_string(),
                quantity: 1,
            },
        )
        .await
        .expect_err("anonymous add");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
