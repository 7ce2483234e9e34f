#![allow(dead_code)]

// Router and request helpers shared by the integration tests. Cookies go through
// `tower_cookies::Cookie` in both directions, the same way a browser would replay them.
use axum::{Extension, Router, body::Body, routing::get};
use cookie_session_storage::{CookieSessionConfig, CookieSessionLayer, Session};
use http::{HeaderMap, Request, Response, header};
use http_body_util::BodyExt as _;
use tower::ServiceExt as _;
use tower_cookies::Cookie;

pub const SECRET: &str = "qwerty";

pub async fn body_string(body: Body) -> String {
    // Collect an Axum body into a UTF-8 string for assertions.
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn make_signed_layer(config: CookieSessionConfig) -> CookieSessionLayer {
    CookieSessionLayer::from_config(config.with_secret(SECRET))
        .expect("layer configures successfully")
}

pub fn routes() -> Router {
    // Routes to write, read and drop a single `user` key.
    Router::new()
        .route(
            "/set-user",
            get(|Extension(session): Extension<Session>| async move {
                session
                    .insert("user", "alice")
                    .expect("session insert succeeds");
            }),
        )
        .route(
            "/get-user",
            get(|Extension(session): Extension<Session>| async move {
                session
                    .get::<String>("user")
                    .expect("session get succeeds")
                    .unwrap_or_else(|| "none".to_string())
            }),
        )
        .route(
            "/remove-user",
            get(|Extension(session): Extension<Session>| async move {
                session.remove_value("user");
            }),
        )
        .route(
            "/logout",
            get(|Extension(session): Extension<Session>| async move {
                session.destroy();
            }),
        )
}

pub async fn get_path(app: &Router, uri: &str, cookie: Option<&Cookie<'_>>) -> Response<Body> {
    // Issue a GET, optionally replaying a session cookie.
    let mut req = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie_header_value(cookie));
    }
    let req = req.body(Body::empty()).expect("request builds successfully");
    app.clone().oneshot(req).await.expect("service call succeeds")
}

pub fn get_session_cookie(res: &Response<Body>) -> Cookie<'static> {
    // Convenience: parse the session cookie from a response.
    get_session_cookie_from_headers(res.headers())
}

fn get_session_cookie_from_headers(headers: &HeaderMap) -> Cookie<'static> {
    // Parse the `Set-Cookie` header into a `Cookie` structure.
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

pub fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    // Encode a cookie for use in a `Cookie` request header.
    cookie.encoded().to_string()
}
