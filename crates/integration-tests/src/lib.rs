//! Integration tests for the Demo Dashboard.
//!
//! Each test starts the full web app on an ephemeral port, pointed at an
//! in-process fake of the dummyjson API, and drives it over HTTP with a
//! cookie-keeping client the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p demo-dashboard-integration-tests
//! ```
//!
//! The fake API knows one user (`emilys` / `emilyspass`), three products,
//! two posts, and three comments.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use demo_dashboard_web::config::DashboardConfig;
use demo_dashboard_web::state::AppState;
use serde_json::{Value, json};
use url::Url;

/// Username the fake API accepts.
pub const USERNAME: &str = "emilys";
/// Password the fake API accepts.
pub const PASSWORD: &str = "emilyspass";

const TOKEN: &str = "test-token";

// =============================================================================
// Fake API
// =============================================================================

fn products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Essence Mascara Lash Princess",
            "description": "A popular mascara known for its volumizing effects.",
            "price": 20,
            "discountPercentage": 10,
            "rating": 4.94,
            "stock": 5,
            "brand": "Essence",
            "category": "beauty",
            "thumbnail": "https://cdn.dummyjson.com/products/1/thumbnail.png",
            "images": ["https://cdn.dummyjson.com/products/1/1.png"]
        },
        {
            "id": 2,
            "title": "Eyeshadow Palette with Mirror",
            "description": "A versatile range of eyeshadow shades.",
            "price": 19.99,
            "discountPercentage": 0,
            "rating": 3.28,
            "stock": 44,
            "brand": "Glamour Beauty",
            "category": "beauty",
            "thumbnail": "https://cdn.dummyjson.com/products/2/thumbnail.png",
            "images": []
        },
        {
            "id": 3,
            "title": "Apple",
            "description": "Fresh and crisp apples.",
            "price": 1.99,
            "discountPercentage": 12.62,
            "rating": 4.19,
            "stock": 8,
            "category": "groceries",
            "thumbnail": "https://cdn.dummyjson.com/products/3/thumbnail.png",
            "images": []
        }
    ])
}

fn posts() -> Value {
    json!([
        {
            "id": 1,
            "title": "His mother had always taught him",
            "body": "His mother had always taught him not to ever think of himself as better than others.",
            "userId": 121,
            "tags": ["history", "american", "crime"],
            "reactions": {"likes": 192, "dislikes": 25},
            "views": 305
        },
        {
            "id": 2,
            "title": "He was an expert but not in a discipline",
            "body": "He was an expert but not in a discipline that anyone could fully appreciate.",
            "userId": 91,
            "tags": ["french", "fiction", "english", "magical"],
            "reactions": 7
        }
    ])
}

fn comments() -> Value {
    json!([
        {"id": 1, "body": "This is some awesome thinking!", "postId": 1, "likes": 3,
         "user": {"id": 63, "username": "eburras1q", "fullName": "Emmett Burras"}},
        {"id": 2, "body": "What terrific math skills you're showing!", "postId": 1, "likes": 4,
         "user": {"id": 71, "username": "lenna", "fullName": "Lenna Renner"}},
        {"id": 3, "body": "You are an amazing writer!", "postId": 2, "likes": 2,
         "user": {"id": 29, "username": "ccrosbie", "fullName": "Carlo Crosbie"}}
    ])
}

fn not_found(what: &str, id: i32) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": format!("{what} with id '{id}' not found")})),
    )
        .into_response()
}

fn page(key: &str, items: Vec<Value>) -> Json<Value> {
    let total = items.len();
    Json(json!({key: items, "total": total, "skip": 0, "limit": 30}))
}

fn array(value: Value) -> Vec<Value> {
    value.as_array().cloned().unwrap_or_default()
}

fn find(items: Value, id: i32) -> Option<Value> {
    array(items)
        .into_iter()
        .find(|item| item["id"] == json!(id))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({
            "id": 1,
            "username": USERNAME,
            "email": "emily.johnson@x.dummyjson.com",
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
            "image": "https://dummyjson.com/icon/emilys/128",
            "accessToken": TOKEN,
            "refreshToken": "refresh"
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn me(headers: HeaderMap) -> Response {
    let bearer = format!("Bearer {TOKEN}");
    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok());
    if authorization == Some(bearer.as_str()) {
        Json(json!({"id": 1, "username": USERNAME, "firstName": "Emily", "lastName": "Johnson"}))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid/expired Token!"})),
        )
            .into_response()
    }
}

async fn product(Path(id): Path<i32>) -> Response {
    find(products(), id).map_or_else(|| not_found("Product", id), |p| Json(p).into_response())
}

async fn post_detail(Path(id): Path<i32>) -> Response {
    find(posts(), id).map_or_else(|| not_found("Post", id), |p| Json(p).into_response())
}

async fn post_comments(Path(id): Path<i32>) -> Json<Value> {
    let matching = array(comments())
        .into_iter()
        .filter(|c| c["postId"] == json!(id))
        .collect();
    page("comments", matching)
}

/// Serve the fake API on an ephemeral port and return its base URL.
pub async fn spawn_fake_api() -> Url {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/products", get(|| async { page("products", array(products())) }))
        .route("/products/{id}", get(product))
        .route("/posts", get(|| async { page("posts", array(posts())) }))
        .route("/posts/{id}", get(post_detail))
        .route("/posts/{id}/comments", get(post_comments))
        .route("/comments", get(|| async { page("comments", array(comments())) }))
        .route("/test", get(|| async { Json(json!({"status": "ok", "method": "GET"})) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}")).unwrap()
}

// =============================================================================
// Dashboard Under Test
// =============================================================================

/// A running dashboard plus a browser-like client.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Start the dashboard against a fresh fake API.
    ///
    /// Checkout runs without its processing delay and failed reads retry
    /// quickly so the tests stay fast.
    pub async fn spawn() -> Self {
        let mut config = DashboardConfig::for_api(spawn_fake_api().await);
        config.checkout.processing_delay = Duration::ZERO;
        config.query.retry_base_delay = Duration::from_millis(5);

        let state = AppState::new(config).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, demo_dashboard_web::app(state))
                .await
                .unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: format!("http://{addr}"),
            client,
        }
    }

    /// `GET` a path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.address))
            .send()
            .await
            .unwrap()
    }

    /// `POST` an urlencoded form to a path.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        self.client
            .post(format!("{}{path}", self.address))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Log in with the given credentials.
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    /// Log in as the known user and assert it worked.
    pub async fn login_ok(&self) {
        let response = self.login(USERNAME, PASSWORD).await;
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/");
    }
}

/// The `Location` header of a redirect.
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
