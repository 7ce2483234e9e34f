use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use cookie_session_storage::{CookieSessionConfig, CookieSessionLayer, SameSite, Session};
use time::Duration;

async fn index(Extension(session): Extension<Session>) -> String {
    let n: usize = session
        .get("n")
        .expect("session get succeeds")
        .unwrap_or(0);
    session
        .insert("n", n + 1)
        .expect("session insert succeeds");
    format!("n={n}")
}

async fn logout(Extension(session): Extension<Session>) -> &'static str {
    session.destroy();
    "bye"
}

#[tokio::main]
async fn main() {
    let session_config = CookieSessionConfig::default()
        // Default: "session"
        .with_name("session")
        // The first secret signs, every listed secret verifies.
        .with_secret("replace-me-with-a-long-random-secret")
        .with_secret("previous-secret")
        // Default: disabled
        .with_encoding(true)
        // Default: true
        .with_http_only(true)
        // Default: SameSite::Lax
        .with_same_site(SameSite::Strict)
        // Default: None
        .with_max_age(Duration::hours(1))
        // Default: true (set to false for local HTTP development)
        .with_secure(false)
        // Default: "/"
        .with_path("/")
        // Default: 4096
        .with_max_cookie_bytes(4096);
    let session_layer =
        CookieSessionLayer::from_config(session_config).expect("session config is valid");

    let app = Router::new()
        .route("/", get(index))
        .route("/logout", get(logout))
        .layer(session_layer);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
