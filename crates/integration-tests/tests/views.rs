//! Read-only views over HTTP.

use demo_dashboard_integration_tests::TestApp;

#[tokio::test]
async fn test_dashboard_shows_stats_and_previews() {
    let app = TestApp::spawn().await;
    app.login_ok().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Essence Mascara Lash Princess"));
    assert!(body.contains("His mother had always taught him"));
    assert!(body.contains(r#"<span class="stat-value">3</span>"#));
    assert!(body.contains(r#"<span class="stat-value">2</span>"#));
}

#[tokio::test]
async fn test_products_filter() {
    let app = TestApp::spawn().await;
    app.login_ok().await;

    let body = app.get("/products").await.text().await.unwrap();
    assert!(body.contains("Showing 3 of 3 products"));
    // Observed bounds prefill the form
    assert!(body.contains(r#"name="min_price" value="1.99""#));
    assert!(body.contains(r#"name="max_price" value="20""#));

    let body = app
        .get("/products?search=MASCARA&category=all")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Showing 1 of 3 products"));

    // Adding to cart returns to the filtered grid
    let body = app
        .get("/products?search=MASCARA")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains(r#"name="redirect_to" value="#));
    assert!(body.contains(r#"?search=MASCARA""#));

    let body = app
        .get("/products?category=groceries&max_price=1")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("No products match these filters."));
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let app = TestApp::spawn().await;
    app.login_ok().await;

    let response = app.get("/products/1").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("$18.00"));
    assert!(body.contains("4.9 / 5"));

    let response = app.get("/products/999").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_post_detail_lists_its_comments() {
    let app = TestApp::spawn().await;
    app.login_ok().await;

    let body = app.get("/posts/1").await.text().await.unwrap();
    assert!(body.contains("192 likes"));
    assert!(body.contains("@eburras1q"));
    assert!(body.contains("@lenna"));
    assert!(!body.contains("@ccrosbie"));

    let body = app.get("/comments").await.text().await.unwrap();
    assert!(body.contains("@ccrosbie"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/health").await.status(), 200);
    assert_eq!(app.get("/health/ready").await.status(), 200);
}
