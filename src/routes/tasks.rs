use crate::{
    auth::{AuthenticatedUser, RequireRole},
    error::AppError,
    models::TaskInput,
    usecases::TaskUseCase,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists every task, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task`.
/// - `401 Unauthorized`: missing or invalid token.
#[get("", wrap = "RequireRole::authenticated()")]
pub async fn get_tasks(tasks: web::Data<TaskUseCase>) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(tasks.list_tasks().await?))
}

/// Creates a task owned by the caller. Admin only.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: invalid payload.
/// - `401 Unauthorized` / `403 Forbidden`: missing/invalid token, or not an admin.
#[post("", wrap = "RequireRole::admin()")]
pub async fn create_task(
    tasks: web::Data<TaskUseCase>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.add_task(task_data.into_inner(), &user.0).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Fetches one task.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task.
#[get("/{id}", wrap = "RequireRole::authenticated()")]
pub async fn get_task(
    tasks: web::Data<TaskUseCase>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(tasks.get_task(&task_id).await?))
}

/// Replaces a task's fields. Admin only.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: `id` is not a UUID or the payload is invalid.
/// - `401 Unauthorized` / `403 Forbidden`: missing/invalid token, or not an admin.
/// - `404 Not Found`: no such task.
#[put("/{id}", wrap = "RequireRole::admin()")]
pub async fn update_task(
    tasks: web::Data<TaskUseCase>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.update_task(&task_id, task_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. Admin only.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `401 Unauthorized` / `403 Forbidden`: missing/invalid token, or not an admin.
/// - `404 Not Found`: no such task.
#[delete("/{id}", wrap = "RequireRole::admin()")]
pub async fn delete_task(
    tasks: web::Data<TaskUseCase>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(&task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
