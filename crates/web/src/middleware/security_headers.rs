//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The dashboard renders
//! plain HTML forms and runs no scripts, so the policy stays locked down.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content Security Policy for every page.
///
/// Images come from the demo API's CDN; nothing else is loaded cross-origin.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'none'; \
     style-src 'self'; \
     img-src 'self' https://cdn.dummyjson.com https://dummyjson.com; \
     connect-src 'self'; \
     frame-src 'none'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: no-referrer` - Zero referrer leakage
/// - `Content-Security-Policy` - see [`CONTENT_SECURITY_POLICY_VALUE`]
/// - `Permissions-Policy` - Deny sensitive features
/// - `Cache-Control: no-store, max-age=0` - Pages carry per-session cart data
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
///
/// There is no `Cross-Origin-Embedder-Policy`: the image CDN does not send
/// CORP headers.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let is_static = request.uri().path().starts_with("/static/");
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), \
             geolocation=(), \
             microphone=(), \
             payment=(), \
             usb=(), \
             interest-cohort=()",
        ),
    );

    // Static assets may be cached; pages may not
    if !is_static {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/static/css/main.css", get(|| async { "body{}" }))
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn get_path(path: &str) -> Response {
        app()
            .oneshot(HttpRequest::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_page_headers() {
        let response = get_path("/").await;
        let headers = response.headers();
        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert!(
            headers
                .get(CONTENT_SECURITY_POLICY)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("https://cdn.dummyjson.com")
        );
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "no-store, max-age=0");
    }

    #[tokio::test]
    async fn test_static_assets_are_cacheable() {
        let response = get_path("/static/css/main.css").await;
        assert!(response.headers().get(CACHE_CONTROL).is_none());
        assert!(response.headers().get(CONTENT_SECURITY_POLICY).is_some());
    }
}
