use crate::{auth::RequireRole, error::AppError, usecases::AccountUseCase};
use actix_web::{patch, web, HttpResponse, Responder};
use serde_json::json;

/// Promote an account to `Admin`
///
/// Admin only.
///
/// ## Responses:
/// - `200 OK`: the account now holds `Admin`.
/// - `401 Unauthorized` / `403 Forbidden`: missing/invalid token, or not an admin.
/// - `404 Not Found`: no account with this id.
#[patch("/{id}/promote", wrap = "RequireRole::admin()")]
pub async fn promote(
    accounts: web::Data<AccountUseCase>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    accounts.promote_user(&user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "user promoted to Admin",
        "id": user_id,
    })))
}
