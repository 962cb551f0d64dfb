#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use storefront_api::config::ServerConfig;
use storefront_api::router::build_app_router;
use storefront_api::state::{AppState, Stores};
use storefront_api::webhook::WebhookVerifier;
use storefront_core::auth::{SessionConfig, TokenConfig};
use storefront_core::memory::{
    MemoryCart, MemoryCatalog, MemoryOrderStore, MemorySessionStore, MemoryUserStore,
};

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const PASSWORD: &str = "s3cure-passw0rd";

/// Build a test `ServerConfig` with safe defaults and cheap hashing.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: TokenConfig::new("api-integration-secret"),
        session: SessionConfig {
            refresh_ttl: Duration::days(7),
        },
        argon2: argon2::Params::new(8, 1, 1, None).expect("valid argon2 params"),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        webhook_tolerance_secs: 300,
        catalog_base_url: "http://catalog.invalid".to_string(),
        catalog_cache_ttl_secs: 0,
        order_currency: "usd".to_string(),
        session_sweep_interval_secs: 3600,
        cookie_secure: true,
    }
}

/// The router plus handles on the in-memory stores behind it.
pub struct TestApp {
    pub router: Router,
    pub users: MemoryUserStore,
    pub sessions: MemorySessionStore,
    pub orders: MemoryOrderStore,
    pub cart: MemoryCart,
    pub catalog: MemoryCatalog,
}

/// Build the full application router over in-memory collaborators.
pub fn build_test_app() -> TestApp {
    let users = MemoryUserStore::new();
    let sessions = MemorySessionStore::new();
    let orders = MemoryOrderStore::new();
    let cart = MemoryCart::new();
    let catalog = MemoryCatalog::new();

    let stores = Stores {
        users: Arc::new(users.clone()),
        sessions: Arc::new(sessions.clone()),
        orders: Arc::new(orders.clone()),
        cart: Arc::new(cart.clone()),
        catalog: Arc::new(catalog.clone()),
    };
    let state = AppState::new(test_config(), stores, None);

    TestApp {
        router: build_app_router(state),
        users,
        sessions,
        orders,
        cart,
        catalog,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_with_cookie(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a webhook body signed with the test secret at the current time.
    pub async fn post_signed_webhook(&self, payload: &str) -> Response<Body> {
        let verifier = WebhookVerifier::new(WEBHOOK_SECRET, 300);
        let signature = verifier.sign(chrono::Utc::now().timestamp(), payload.as_bytes());
        self.send(
            Request::post("/api/v1/webhooks/stripe")
                .header(CONTENT_TYPE, "application/json")
                .header("stripe-signature", signature)
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Register then log in; returns the access token and the `name=value`
    /// refresh cookie pair.
    pub async fn register_and_login(&self, email: &str) -> (String, String) {
        let response = self
            .post_json(
                "/api/v1/auth/register",
                serde_json::json!({ "email": email, "password": PASSWORD, "full_name": "Test User" }),
            )
            .await;
        assert_eq!(response.status(), 201, "registration should succeed");

        let response = self
            .post_json(
                "/api/v1/auth/login",
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), 200, "login should succeed");
        let cookie = refresh_cookie_pair(&response);
        let json = body_json(response).await;
        let token = json["data"]["access_token"]
            .as_str()
            .expect("access token in body")
            .to_string();
        (token, cookie)
    }
}

/// Collect the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// The full `Set-Cookie` header for the refresh cookie.
pub fn set_cookie_header(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refresh_token="))
        .unwrap_or_else(|| panic!("missing refresh_token Set-Cookie: {:?}", response.headers()))
        .to_string()
}

/// `refresh_token=<value>` as a client would send it back.
pub fn refresh_cookie_pair(response: &Response<Body>) -> String {
    set_cookie_header(response)
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}
