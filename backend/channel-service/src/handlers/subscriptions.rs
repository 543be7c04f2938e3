/// Channel subscription endpoints.
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{subscription_repo, user_repo, ToggleOutcome};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::utils::api_response::ApiResponse;
use crate::utils::pagination::{Page, PageQuery};

/// POST /subscriptions/channels/{channel_id}
pub async fn toggle_subscription(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid channel ID".to_string()))?;

    if channel_id == auth.0 {
        return Err(AppError::BadRequest(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    if !user_repo::exists(pool.get_ref(), channel_id).await? {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    match subscription_repo::toggle(pool.get_ref(), auth.0, channel_id).await? {
        ToggleOutcome::Created(subscription) => Ok(HttpResponse::Created().json(ApiResponse::ok(
            201,
            subscription,
            "Subscribed successfully",
        ))),
        ToggleOutcome::Removed => Ok(HttpResponse::Ok().json(ApiResponse::message_only(
            200,
            "Unsubscribed successfully",
        ))),
    }
}

/// GET /channels/{channel_id}/subscribers
pub async fn get_channel_subscribers(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let channel_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid channel ID".to_string()))?;

    if !user_repo::exists(pool.get_ref(), channel_id).await? {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    let (items, total) = subscription_repo::list_subscribers(pool.get_ref(), channel_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &query),
        "Subscribers fetched successfully",
    )))
}

/// GET /users/{user_id}/subscriptions
pub async fn get_subscribed_channels(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let subscriber_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid subscriber ID".to_string()))?;

    if !user_repo::exists(pool.get_ref(), subscriber_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let (items, total) =
        subscription_repo::list_subscribed_channels(pool.get_ref(), subscriber_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &query),
        "Subscribed channels fetched successfully",
    )))
}
