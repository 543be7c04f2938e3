/// Comment endpoints, scoped to a video on the read/create side.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{comment_repo, video_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::ownership::ensure_owner;
use crate::utils::api_response::ApiResponse;
use crate::utils::pagination::{Page, PageQuery};
use crate::validators::{content_change, normalized_content};

#[derive(Debug, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

/// GET /videos/{video_id}/comments
pub async fn get_video_comments(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "Invalid video ID")?;

    if video_repo::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let (items, total) = comment_repo::list_for_video(pool.get_ref(), video_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &query),
        "Comments fetched successfully",
    )))
}

/// POST /videos/{video_id}/comments
pub async fn add_comment(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "Invalid video ID")?;
    payload.validate()?;

    let content = normalized_content(&payload.content)
        .ok_or_else(|| AppError::BadRequest("Comment content cannot be empty".to_string()))?;

    if video_repo::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let comment = comment_repo::create_comment(pool.get_ref(), video_id, auth.0, &content).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        201,
        comment,
        "Comment added successfully",
    )))
}

/// PATCH /comments/{id}
pub async fn update_comment(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    let id = parse_id(&path, "Invalid comment ID")?;

    if normalized_content(&payload.content).is_none() {
        return Err(AppError::BadRequest(
            "Comment content cannot be empty".to_string(),
        ));
    }

    let comment = comment_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
    ensure_owner(auth.0, &comment)?;

    let new_content = content_change(Some(&payload.content), &comment.content)
        .ok_or_else(|| AppError::BadRequest("No changes detected".to_string()))?;

    let updated = comment_repo::update_content(pool.get_ref(), id, &new_content).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        updated,
        "Comment updated successfully",
    )))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_id(&path, "Invalid comment ID")?;

    let comment = comment_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
    ensure_owner(auth.0, &comment)?;

    comment_repo::delete_comment(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only(
        200,
        "Comment deleted successfully",
    )))
}

fn parse_id(raw: &str, message: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(message.to_string()))
}
