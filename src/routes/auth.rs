use crate::{
    auth::{AccountResponse, AuthResponse, AuthorizationFilter, LoginRequest, RegisterRequest},
    error::AppError,
    usecases::AccountUseCase,
};
use actix_web::{cookie::Cookie, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new account
///
/// The very first account becomes `Admin`; every later one starts as `User`.
///
/// ## Responses:
/// - `201 Created`: the new account (`id`, `username`, `role`).
/// - `400 Bad Request`: malformed JSON or a payload failing validation.
/// - `409 Conflict`: the username is taken.
#[post("/register")]
pub async fn register(
    accounts: web::Data<AccountUseCase>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let account = accounts
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(AccountResponse::from(&account)))
}

/// Log in
///
/// Returns a bearer token and sets it as an `HttpOnly` cookie as well.
///
/// ## Responses:
/// - `200 OK`: `{ token, account }`.
/// - `400 Bad Request`: malformed JSON or a payload failing validation.
/// - `401 Unauthorized`: unknown username or wrong password (same body for both).
#[post("/login")]
pub async fn login(
    accounts: web::Data<AccountUseCase>,
    filter: web::Data<AuthorizationFilter>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let session = accounts
        .login(&login_data.username, &login_data.password)
        .await?;

    let cookie = Cookie::build(filter.cookie_name().to_owned(), session.token.clone())
        .path("/")
        .http_only(true)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        token: session.token,
        account: AccountResponse::from(&session.account),
    }))
}
