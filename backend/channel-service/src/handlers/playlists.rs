/// Playlist endpoints: CRUD plus ordered video membership.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{playlist_repo, video_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::ownership::ensure_owner;
use crate::utils::api_response::ApiResponse;
use crate::utils::pagination::{Page, PageQuery};
use crate::validators::{content_change, normalized_content};

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// POST /playlists
pub async fn create_playlist(
    auth: UserId,
    pool: web::Data<PgPool>,
    payload: web::Json<CreatePlaylistPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let name = normalized_content(&payload.name)
        .ok_or_else(|| AppError::BadRequest("All fields are mandatory".to_string()))?;
    let description = normalized_content(&payload.description)
        .ok_or_else(|| AppError::BadRequest("All fields are mandatory".to_string()))?;

    let playlist = playlist_repo::create_playlist(pool.get_ref(), auth.0, &name, &description).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        201,
        playlist,
        "Playlist created successfully",
    )))
}

/// GET /users/{user_id}/playlists
pub async fn get_user_playlists(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let user_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::BadRequest("Invalid user ID".to_string()))?;

    let (items, total) = playlist_repo::list_by_owner(pool.get_ref(), user_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &query),
        "User playlists fetched successfully",
    )))
}

/// GET /playlists/{id}
pub async fn get_playlist(pool: web::Data<PgPool>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = parse_playlist_id(&path)?;

    match playlist_repo::get_view(pool.get_ref(), id).await? {
        Some(view) => Ok(HttpResponse::Ok().json(ApiResponse::ok(
            200,
            view,
            "Playlist fetched successfully",
        ))),
        None => Err(AppError::NotFound("Playlist not found".to_string())),
    }
}

/// PATCH /playlists/{id}
pub async fn update_playlist(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    payload: web::Json<UpdatePlaylistPayload>,
) -> Result<HttpResponse> {
    let id = parse_playlist_id(&path)?;

    if payload.name.is_none() && payload.description.is_none() {
        return Err(AppError::BadRequest(
            "At least one field is required to update".to_string(),
        ));
    }

    let playlist = playlist_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;
    ensure_owner(auth.0, &playlist)?;

    let new_name = content_change(payload.name.as_deref(), &playlist.name);
    let new_description = content_change(payload.description.as_deref(), &playlist.description);

    if new_name.is_none() && new_description.is_none() {
        return Err(AppError::BadRequest("No changes detected".to_string()));
    }

    let updated = playlist_repo::update_playlist(
        pool.get_ref(),
        id,
        new_name.as_deref(),
        new_description.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        updated,
        "Playlist updated successfully",
    )))
}

/// DELETE /playlists/{id}
pub async fn delete_playlist(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_playlist_id(&path)?;

    let playlist = playlist_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;
    ensure_owner(auth.0, &playlist)?;

    playlist_repo::delete_playlist(pool.get_ref(), id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only(
        200,
        "Playlist deleted successfully",
    )))
}

/// POST /playlists/{id}/videos/{video_id}
pub async fn add_video_to_playlist(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = parse_membership_path(&path)?;

    let playlist = playlist_repo::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;
    ensure_owner(auth.0, &playlist)?;

    if video_repo::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    playlist_repo::add_video(pool.get_ref(), playlist_id, video_id).await?;

    let view = playlist_repo::get_view(pool.get_ref(), playlist_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(200, view, "Video added to playlist")))
}

/// DELETE /playlists/{id}/videos/{video_id}
pub async fn remove_video_from_playlist(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = parse_membership_path(&path)?;

    let playlist = playlist_repo::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;
    ensure_owner(auth.0, &playlist)?;

    playlist_repo::remove_video(pool.get_ref(), playlist_id, video_id).await?;

    let view = playlist_repo::get_view(pool.get_ref(), playlist_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        view,
        "Video removed from playlist successfully",
    )))
}

fn parse_playlist_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid playlist ID".to_string()))
}

fn parse_membership_path(path: &(String, String)) -> Result<(Uuid, Uuid)> {
    let playlist_id = Uuid::parse_str(&path.0);
    let video_id = Uuid::parse_str(&path.1);

    match (playlist_id, video_id) {
        (Ok(p), Ok(v)) => Ok((p, v)),
        _ => Err(AppError::BadRequest(
            "Invalid playlist or video ID".to_string(),
        )),
    }
}
