//! Login, logout, and route protection over HTTP.

use demo_dashboard_integration_tests::{PASSWORD, TestApp, USERNAME, location};

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");
}

fn session_cookie_set(response: &reqwest::Response) -> bool {
    response.cookies().any(|c| c.name() == "dd_session")
}

#[tokio::test]
async fn test_wrong_credentials_stay_anonymous() {
    let app = TestApp::spawn().await;

    let response = app.login(USERNAME, "wrong").await;
    assert_eq!(response.status(), 401);
    assert!(!session_cookie_set(&response), "no session is started");
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid credentials"));
    assert!(body.contains(r#"value="emilys""#), "username is kept in the form");

    let response = app.get("/").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_wrong_credentials_keep_existing_session() {
    let app = TestApp::spawn().await;
    app.login_ok().await;
    app.post_form("/cart/add", &[("product_id", "1")]).await;

    let response = app.login(USERNAME, "wrong").await;
    assert_eq!(response.status(), 401);
    assert!(!session_cookie_set(&response), "session id is not rotated");

    // Same token, same profile, same cart
    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Emily Johnson"));
    let count = app.get("/cart/count").await.text().await.unwrap();
    assert!(count.contains(">1<"));
}

#[tokio::test]
async fn test_blank_fields_are_rejected_before_the_api() {
    let app = TestApp::spawn().await;

    let response = app.login("", "").await;
    assert_eq!(response.status(), 422);
    let body = response.text().await.unwrap();
    assert!(body.contains("Username is required"));
    assert!(body.contains("Password is required"));
}

#[tokio::test]
async fn test_login_then_logout() {
    let app = TestApp::spawn().await;
    app.login_ok().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Emily Johnson"));

    // Signed-in users skip the login form
    let response = app.get("/login").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");

    let response = app.get("/").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_rotates_the_session_cookie() {
    let app = TestApp::spawn().await;

    let before = app.get("/login").await;
    let anonymous_cookie = before
        .cookies()
        .find(|c| c.name() == "dd_session")
        .map(|c| c.value().to_string());

    let response = app.login(USERNAME, PASSWORD).await;
    let signed_in_cookie = response
        .cookies()
        .find(|c| c.name() == "dd_session")
        .map(|c| c.value().to_string());

    assert!(signed_in_cookie.is_some());
    assert_ne!(anonymous_cookie, signed_in_cookie);
}
