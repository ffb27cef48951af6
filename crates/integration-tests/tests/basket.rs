//! Integration tests for the basket flow.

use scamazon_core::ProductId;
use scamazon_integration_tests::TestContext;

#[tokio::test]
async fn test_empty_basket() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/basket").await;

    assert_eq!(status, 200);
    assert!(body.contains("Your Scamazon Basket is empty."));
}

#[tokio::test]
async fn test_add_redirects_to_basket() {
    let ctx = TestContext::new().await;

    let (path, status, body) = ctx
        .post("/basket/add", &[("product_id", "1"), ("quantity", "2")])
        .await;

    assert_eq!(path, "/basket");
    assert_eq!(status, 200);
    assert!(body.contains("iPhone 9"));
    assert!(body.contains("Subtotal (2 items)"));
    assert!(body.contains("£1098.00"));
}

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let ctx = TestContext::new().await;

    ctx.post("/basket/add", &[("product_id", "1")]).await;
    ctx.post("/basket/add", &[("product_id", "1"), ("quantity", "2")])
        .await;

    let basket = ctx.backend.basket().await;
    assert_eq!(basket.items().len(), 1);
    assert_eq!(basket.item_count(), 3);

    let (_, body) = ctx.get("/basket").await;
    assert!(body.contains("Qty: 3"));
}

#[tokio::test]
async fn test_add_uses_current_product() {
    let ctx = TestContext::new().await;

    ctx.get("/product/4").await;
    ctx.post("/basket/add", &[("product_id", "4")]).await;

    assert_eq!(ctx.backend.calls("GET /api/products/4").await, 1);
    assert!(ctx.backend.basket().await.contains(ProductId::new(4)));
}

#[tokio::test]
async fn test_add_rejects_zero_quantity() {
    let ctx = TestContext::new().await;

    let (_, status, _) = ctx
        .post("/basket/add", &[("product_id", "1"), ("quantity", "0")])
        .await;

    assert_eq!(status, 400);
    assert!(ctx.backend.basket().await.is_empty());
}

#[tokio::test]
async fn test_remove_line() {
    let ctx = TestContext::new().await;
    ctx.post("/basket/add", &[("product_id", "1")]).await;
    ctx.post("/basket/add", &[("product_id", "2")]).await;

    let (path, _, body) = ctx.post("/basket/remove", &[("product_id", "1")]).await;

    assert_eq!(path, "/basket");
    assert!(!body.contains("iPhone 9"));
    assert!(body.contains("iPhone X"));
    assert!(!ctx.backend.basket().await.contains(ProductId::new(1)));
}

#[tokio::test]
async fn test_removing_absent_line_skips_backend() {
    let ctx = TestContext::new().await;
    ctx.post("/basket/add", &[("product_id", "1")]).await;

    let (path, status, _) = ctx.post("/basket/remove", &[("product_id", "3")]).await;

    assert_eq!((path.as_str(), status.as_u16()), ("/basket", 200));
    assert_eq!(ctx.backend.calls("DELETE /api/basket/remove").await, 0);
}

#[tokio::test]
async fn test_clear_basket() {
    let ctx = TestContext::new().await;
    ctx.post("/basket/add", &[("product_id", "1")]).await;
    ctx.post("/basket/add", &[("product_id", "4")]).await;

    let (_, _, body) = ctx.post("/basket/clear", &[]).await;

    assert!(body.contains("Your Scamazon Basket is empty."));
    assert!(ctx.backend.basket().await.is_empty());
}

#[tokio::test]
async fn test_header_shows_basket_count() {
    let ctx = TestContext::new().await;
    ctx.post("/basket/add", &[("product_id", "2"), ("quantity", "4")])
        .await;

    let (_, body) = ctx.get("/").await;

    assert!(body.contains(r#"<span class="basket-count">4</span>"#));
}

#[tokio::test]
async fn test_large_adds_are_summed_not_capped() {
    let ctx = TestContext::new().await;

    ctx.post("/basket/add", &[("product_id", "2"), ("quantity", "600")])
        .await;
    let (_, status, body) = ctx
        .post("/basket/add", &[("product_id", "2"), ("quantity", "600")])
        .await;

    assert_eq!(status, 200);
    assert!(body.contains("Qty: 1200"));
    assert_eq!(ctx.backend.basket().await.item_count(), 1200);
}

#[tokio::test]
async fn test_single_add_above_limit_is_rejected() {
    let ctx = TestContext::new().await;

    let (_, status, _) = ctx
        .post("/basket/add", &[("product_id", "2"), ("quantity", "1000")])
        .await;

    assert_eq!(status, 400);
    assert!(ctx.backend.basket().await.is_empty());
}
