//! Integration tests for sign-in, registration and sign-out.

use scamazon_integration_tests::{EMAIL, TestContext};

#[tokio::test]
async fn test_email_step_rejects_bad_email() {
    let ctx = TestContext::new().await;

    let (_, status, body) = ctx
        .post("/signin", &[("step", "email"), ("email", "not-an-email")])
        .await;

    assert_eq!(status, 422);
    assert!(body.contains("Enter a valid email address"));
    assert!(!body.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_email_step_moves_to_password_step() {
    let ctx = TestContext::new().await;

    let (_, status, body) = ctx
        .post("/signin", &[("step", "email"), ("email", EMAIL)])
        .await;

    assert_eq!(status, 200);
    assert!(body.contains(r#"name="password""#));
    assert!(body.contains("Change"));
    assert!(body.contains(EMAIL));
}

#[tokio::test]
async fn test_change_returns_to_email_step() {
    let ctx = TestContext::new().await;

    let (_, status, body) = ctx
        .post("/signin", &[("step", "change"), ("email", EMAIL)])
        .await;

    assert_eq!(status, 200);
    assert!(!body.contains(r#"name="password""#));
    assert!(body.contains(&format!(r#"value="{EMAIL}""#)));
}

#[tokio::test]
async fn test_wrong_password() {
    let ctx = TestContext::new().await;

    let (path, status, body) = ctx
        .post(
            "/signin",
            &[("step", "password"), ("email", EMAIL), ("password", "wrong")],
        )
        .await;

    assert_eq!(path, "/signin");
    assert_eq!(status, 401);
    assert!(body.contains("sign you in with that email and password"));

    let (_, body) = ctx.get("/").await;
    assert!(body.contains("Hello, sign in"));
}

#[tokio::test]
async fn test_sign_in_greets_user() {
    let ctx = TestContext::new().await;

    ctx.sign_in().await;
    let (_, body) = ctx.get("/").await;

    assert!(body.contains("Hello, Ada"));
}

#[tokio::test]
async fn test_register_validates() {
    let ctx = TestContext::new().await;

    let (_, status, body) = ctx
        .post(
            "/register",
            &[
                ("fullname", "Grace Hopper"),
                ("email", "grace@example.com"),
                ("password", "longenough"),
                ("confirm_password", "different1"),
            ],
        )
        .await;

    assert_eq!(status, 422);
    assert!(body.contains("Passwords do not match"));
    assert!(body.contains(r#"value="Grace Hopper""#));
    assert!(!body.contains("longenough"));
}

#[tokio::test]
async fn test_register_then_sign_in() {
    let ctx = TestContext::new().await;

    let (path, status, body) = ctx
        .post(
            "/register",
            &[
                ("fullname", "Grace Hopper"),
                ("email", "grace@example.com"),
                ("password", "cobol1959"),
                ("confirm_password", "cobol1959"),
            ],
        )
        .await;

    assert_eq!((path.as_str(), status.as_u16()), ("/signin", 200));
    assert!(body.contains("Account created. Sign in to continue."));

    let (path, _, _) = ctx
        .post(
            "/signin",
            &[
                ("step", "password"),
                ("email", "grace@example.com"),
                ("password", "cobol1959"),
            ],
        )
        .await;
    assert_eq!(path, "/");
    let (_, body) = ctx.get("/").await;
    assert!(body.contains("Hello, Grace"));
}

#[tokio::test]
async fn test_duplicate_registration_fails() {
    let ctx = TestContext::new().await;

    let (path, status, _) = ctx
        .post(
            "/register",
            &[
                ("fullname", "Ada Lovelace"),
                ("email", EMAIL),
                ("password", "analytical"),
                ("confirm_password", "analytical"),
            ],
        )
        .await;

    assert_eq!(path, "/register");
    assert_eq!(status, 502);
}

#[tokio::test]
async fn test_sign_out_clears_user_and_addresses() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_address("Ada Lovelace", "SW1Y 4JH").await;
    ctx.sign_in().await;
    ctx.get("/account/addresses").await;

    let (path, status, body) = ctx.post("/signout", &[]).await;

    assert_eq!((path.as_str(), status.as_u16()), ("/", 200));
    assert!(body.contains("Hello, sign in"));
    assert_eq!(ctx.backend.calls("POST /api/users/logout").await, 1);

    let response = ctx
        .client
        .get(ctx.url("/account/addresses"))
        .send()
        .await
        .unwrap_or_else(|e| panic!("request failed: {e}"));
    assert_eq!(response.url().path(), "/signin");
}

#[tokio::test]
async fn test_sign_out_starts_a_fresh_basket() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;
    ctx.post("/basket/add", &[("product_id", "1"), ("quantity", "2")])
        .await;

    let (_, body) = ctx.get("/").await;
    assert!(body.contains(r#"<span class="basket-count">2</span>"#));

    let (path, _, body) = ctx.post("/signout", &[]).await;
    assert_eq!(path, "/");
    assert!(body.contains(r#"<span class="basket-count">0</span>"#));
}
