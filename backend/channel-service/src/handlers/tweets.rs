/// Tweet endpoints (short text posts).
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{tweet_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::ownership::ensure_owner;
use crate::utils::api_response::ApiResponse;
use crate::utils::pagination::{Page, PageQuery};
use crate::validators::{content_change, normalized_content};

#[derive(Debug, Deserialize, Validate)]
pub struct TweetPayload {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// POST /tweets
pub async fn create_tweet(
    auth: UserId,
    pool: web::Data<PgPool>,
    payload: web::Json<TweetPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let content = normalized_content(&payload.content)
        .ok_or_else(|| AppError::BadRequest("Content cannot be empty".to_string()))?;

    let tweet = tweet_repo::create_tweet(pool.get_ref(), auth.0, &content).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        201,
        tweet,
        "Tweet created successfully",
    )))
}

/// GET /users/{user_id}/tweets
pub async fn get_user_tweets(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let user_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    if !user_repo::exists(pool.get_ref(), user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let (items, total) = tweet_repo::list_by_owner(pool.get_ref(), user_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &query),
        "Tweets fetched successfully",
    )))
}

/// PATCH /tweets/{id}
pub async fn update_tweet(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    payload: web::Json<TweetPayload>,
) -> Result<HttpResponse> {
    let id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid tweet ID".to_string()))?;

    let tweet = tweet_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))?;
    ensure_owner(auth.0, &tweet)?;

    if normalized_content(&payload.content).is_none() {
        return Err(AppError::BadRequest("Content cannot be empty".to_string()));
    }

    let new_content = content_change(Some(&payload.content), &tweet.content)
        .ok_or_else(|| AppError::BadRequest("No changes detected".to_string()))?;

    let updated = tweet_repo::update_content(pool.get_ref(), id, &new_content).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        updated,
        "Tweet updated successfully",
    )))
}

/// DELETE /tweets/{id}
pub async fn delete_tweet(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid tweet ID".to_string()))?;

    let tweet = tweet_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))?;
    ensure_owner(auth.0, &tweet)?;

    tweet_repo::delete_tweet(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only(
        200,
        "Tweet deleted successfully",
    )))
}
