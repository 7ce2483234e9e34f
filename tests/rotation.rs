// Secret rotation: cookies signed under a retired secret keep working while that secret is still
// listed, and stop working once it is dropped.
mod common;

use axum::Router;
use cookie_session_storage::{CookieSessionConfig, CookieSessionLayer, Secret, unsign};

fn app_with_secrets(secrets: &[&str]) -> Router {
    let config = CookieSessionConfig::default()
        .with_secure(false)
        .with_encoding(true)
        .with_secrets(secrets.iter().copied());
    let layer = CookieSessionLayer::from_config(config).expect("layer configures successfully");
    common::routes().layer(layer)
}

#[tokio::test]
async fn old_cookie_survives_rotation() {
    let before = app_with_secrets(&["2024"]);
    let res = common::get_path(&before, "/set-user", None).await;
    let old_cookie = common::get_session_cookie(&res);

    let after = app_with_secrets(&["2025", "2024"]);
    let res = common::get_path(&after, "/get-user", Some(&old_cookie)).await;
    assert_eq!(common::body_string(res.into_body()).await, "alice");
}

#[tokio::test]
async fn new_cookies_are_signed_with_first_secret() {
    let app = app_with_secrets(&["2025", "2024"]);
    let res = common::get_path(&app, "/set-user", None).await;
    let cookie = common::get_session_cookie(&res);

    assert!(unsign(cookie.value(), &[Secret::from("2025")], false).is_some());
    assert!(unsign(cookie.value(), &[Secret::from("2024")], false).is_none());
}

#[tokio::test]
async fn dropped_secret_is_rejected() {
    let before = app_with_secrets(&["2024"]);
    let res = common::get_path(&before, "/set-user", None).await;
    let old_cookie = common::get_session_cookie(&res);

    let after = app_with_secrets(&["2025"]);
    let res = common::get_path(&after, "/get-user", Some(&old_cookie)).await;
    assert_eq!(common::body_string(res.into_body()).await, "none");
}
