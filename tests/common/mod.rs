#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::json;
use taskwarden::auth::AuthResponse;
use taskwarden::config::Config;
use taskwarden::routes::{self, health};
use taskwarden::AppState;

pub const SECRET: &str = "integration-test-secret";

pub fn config() -> Config {
    Config::from_lookup(|key| (key == "JWT_SECRET").then(|| SECRET.to_string()))
        .expect("test config")
}

/// Builds the full application over in-memory stores.
pub async fn init_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .configure(|cfg| state.register(cfg))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

pub async fn register(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> serde_json::Value {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "register {username}");
    test::read_body_json(resp).await
}

pub async fn login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login {username}");
    test::read_body_json(resp).await
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
