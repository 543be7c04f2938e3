use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::utils::api_response::ApiResponse;

/// GET /users/me
pub async fn get_current_user(auth: UserId, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(pool.get_ref(), auth.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        user,
        "Current user fetched successfully",
    )))
}
