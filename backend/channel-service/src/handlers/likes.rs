/// Like toggle endpoints. One call creates the edge, the next removes it;
/// creation answers 201 with the edge, removal answers 200 with a null
/// payload.
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, like_repo, tweet_repo, video_repo, ToggleOutcome};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::LikeTarget;
use crate::utils::api_response::ApiResponse;
use crate::utils::pagination::{Page, PageQuery};

/// POST /likes/videos/{video_id}
pub async fn toggle_video_like(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;

    if video_repo::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let outcome = like_repo::toggle(pool.get_ref(), auth.0, LikeTarget::Video(video_id)).await?;
    Ok(toggle_response(outcome, "Video liked successfully", "Video unliked successfully"))
}

/// POST /likes/comments/{comment_id}
pub async fn toggle_comment_like(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid comment ID".to_string()))?;

    if comment_repo::find_by_id(pool.get_ref(), comment_id).await?.is_none() {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    let outcome = like_repo::toggle(pool.get_ref(), auth.0, LikeTarget::Comment(comment_id)).await?;
    Ok(toggle_response(outcome, "Comment liked successfully", "Comment unliked successfully"))
}

/// POST /likes/tweets/{tweet_id}
pub async fn toggle_tweet_like(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid tweet ID".to_string()))?;

    if tweet_repo::find_by_id(pool.get_ref(), tweet_id).await?.is_none() {
        return Err(AppError::NotFound("Tweet not found".to_string()));
    }

    let outcome = like_repo::toggle(pool.get_ref(), auth.0, LikeTarget::Tweet(tweet_id)).await?;
    Ok(toggle_response(outcome, "Tweet liked successfully", "Tweet unliked successfully"))
}

/// GET /likes/videos
pub async fn get_liked_videos(
    auth: UserId,
    pool: web::Data<PgPool>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (items, total) = like_repo::list_liked_videos(pool.get_ref(), auth.0, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &query),
        "Liked videos fetched successfully",
    )))
}

fn toggle_response(
    outcome: ToggleOutcome<crate::models::Like>,
    created_message: &str,
    removed_message: &str,
) -> HttpResponse {
    match outcome {
        ToggleOutcome::Created(like) => {
            HttpResponse::Created().json(ApiResponse::ok(201, like, created_message))
        }
        ToggleOutcome::Removed => {
            HttpResponse::Ok().json(ApiResponse::message_only(200, removed_message))
        }
    }
}
