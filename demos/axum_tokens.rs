use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use time::Duration;
use tower_token_cookies::{
    AuthSession, CookieLayout, RotatingCredential, SameSite, TokenCookieConfig, TokenCookieLayer,
    TokenSet,
};

async fn login(Extension(session): Extension<AuthSession>) -> &'static str {
    session.set_tokens(TokenSet::new("id-token", "refresh-token", "custom-token"));
    "logged in"
}

async fn whoami(Extension(session): Extension<AuthSession>) -> String {
    match session.tokens() {
        Some(tokens) => format!("id_token={}", tokens.id_token()),
        None => match session.load_error() {
            Some(err) => format!("anonymous ({})", err.kind()),
            None => "anonymous".to_string(),
        },
    }
}

async fn logout(Extension(session): Extension<AuthSession>) -> &'static str {
    session.clear();
    "logged out"
}

#[tokio::main]
async fn main() {
    // Newest key first. Older keys only verify.
    let credential = RotatingCredential::from_secrets(["current-secret", "previous-secret"])
        .expect("signing keys are valid");
    let config = TokenCookieConfig::default()
        // Default: "AuthToken"
        .with_name("AuthToken")
        // Default: CookieLayout::Single
        .with_layout(CookieLayout::Multiple)
        // Default: 3800
        .with_max_chunk_bytes(3800)
        // Default: 8
        .with_max_chunk_count(8)
        // Default: true
        .with_http_only(true)
        // Default: SameSite::Lax
        .with_same_site(SameSite::Lax)
        // Default: true (set to false for local HTTP development)
        .with_secure(false)
        // Default: "/"
        .with_path("/")
        // Default: None
        .without_domain()
        // Default: None
        .with_max_age(Duration::days(7))
        // Default: true
        .with_clear_on_decode_error(true);
    let token_layer = TokenCookieLayer::new(credential).with_config(config);

    let app = Router::new()
        .route("/login", get(login))
        .route("/whoami", get(whoami))
        .route("/logout", get(logout))
        .layer(token_layer);

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
