/// Video endpoints: publish, fetch, list, update, delete, publish toggle.
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::video_repo::{self, VideoFilter};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::ownership::ensure_owner;
use crate::services::storage::ObjectStorage;
use crate::utils::api_response::ApiResponse;
use crate::utils::pagination::{Page, PageQuery};
use crate::validators::content_change;

#[derive(Debug, Deserialize)]
pub struct VideoListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortType")]
    pub sort_type: Option<String>,
    /// Case-insensitive substring filter on the title.
    pub query: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

impl VideoListQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(10),
            sort_by: self.sort_by.clone(),
            sort_type: self.sort_type.clone(),
        }
    }
}

/// GET /videos
pub async fn list_videos(
    pool: web::Data<PgPool>,
    query: web::Query<VideoListQuery>,
) -> Result<HttpResponse> {
    let filter = VideoFilter {
        query: query.query.clone(),
        owner_id: query.user_id,
    };
    let page = query.page_query();

    let (items, total) = video_repo::list(pool.get_ref(), &filter, &page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        Page::new(items, total, &page),
        "Videos fetched successfully",
    )))
}

/// POST /videos (multipart: title, description, duration, videoFile, thumbnail)
pub async fn publish_video(
    auth: UserId,
    pool: web::Data<PgPool>,
    storage: web::Data<ObjectStorage>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = VideoForm::read(payload).await?;

    let title = form
        .title
        .as_deref()
        .and_then(crate::validators::normalized_content)
        .ok_or_else(|| AppError::BadRequest("Title is required".to_string()))?;
    let description = form
        .description
        .as_deref()
        .and_then(crate::validators::normalized_content)
        .ok_or_else(|| AppError::BadRequest("Description is required".to_string()))?;
    let duration = form
        .duration
        .filter(|d| *d > 0.0)
        .ok_or_else(|| AppError::BadRequest("Duration is required".to_string()))?;
    let video_file = form
        .video_file
        .ok_or_else(|| AppError::BadRequest("Video file and thumbnail are required".to_string()))?;
    let thumbnail = form
        .thumbnail
        .ok_or_else(|| AppError::BadRequest("Video file and thumbnail are required".to_string()))?;

    // Both assets are mandatory for creation; a failed store aborts the write.
    let video_url = storage
        .upload("videos", video_file.bytes, &video_file.content_type)
        .await?;
    let thumbnail_url = storage
        .upload("thumbnails", thumbnail.bytes, &thumbnail.content_type)
        .await?;

    let video = video_repo::create_video(
        pool.get_ref(),
        auth.0,
        &title,
        &description,
        duration,
        &video_url,
        &thumbnail_url,
    )
    .await?;

    tracing::info!("Video published: {} by {}", video.id, auth.0);

    Ok(HttpResponse::Created().json(ApiResponse::ok(
        201,
        video,
        "Video published successfully",
    )))
}

/// GET /videos/{id}
pub async fn get_video(pool: web::Data<PgPool>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = parse_video_id(&path)?;

    match video_repo::get_with_owner(pool.get_ref(), id).await? {
        Some(video) => Ok(HttpResponse::Ok().json(ApiResponse::ok(
            200,
            video,
            "Video fetched successfully",
        ))),
        None => Err(AppError::NotFound("Video not found".to_string())),
    }
}

/// PATCH /videos/{id} (multipart: title?, description?, thumbnail?)
///
/// Text changes and a thumbnail replacement are tracked independently and
/// ORed together: replacing only the thumbnail still counts as an update,
/// while a request that changes nothing is rejected.
pub async fn update_video(
    auth: UserId,
    pool: web::Data<PgPool>,
    storage: web::Data<ObjectStorage>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let id = parse_video_id(&path)?;
    let form = VideoForm::read(payload).await?;

    let video = video_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;
    ensure_owner(auth.0, &video)?;

    let new_title = content_change(form.title.as_deref(), &video.title);
    let new_description = content_change(form.description.as_deref(), &video.description);

    let new_thumbnail_url = match form.thumbnail {
        Some(file) => Some(
            storage
                .upload("thumbnails", file.bytes, &file.content_type)
                .await?,
        ),
        None => None,
    };

    if new_title.is_none() && new_description.is_none() && new_thumbnail_url.is_none() {
        return Err(AppError::BadRequest("No changes detected".to_string()));
    }

    if new_thumbnail_url.is_some() {
        storage.delete_by_url(&video.thumbnail_url).await;
    }

    let updated = video_repo::update_video(
        pool.get_ref(),
        id,
        new_title.as_deref(),
        new_description.as_deref(),
        new_thumbnail_url.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        200,
        updated,
        "Video updated successfully",
    )))
}

/// DELETE /videos/{id}
pub async fn delete_video(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_video_id(&path)?;

    let video = video_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;
    ensure_owner(auth.0, &video)?;

    video_repo::delete_video(pool.get_ref(), id).await?;

    tracing::info!("Video deleted: {} by {}", id, auth.0);

    Ok(HttpResponse::Ok().json(ApiResponse::message_only(
        200,
        "Video deleted successfully",
    )))
}

/// PATCH /videos/{id}/toggle-publish
pub async fn toggle_publish_status(
    auth: UserId,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_video_id(&path)?;

    let video = video_repo::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;
    ensure_owner(auth.0, &video)?;

    let updated = video_repo::set_published(pool.get_ref(), id, !video.is_published).await?;
    let message = if updated.is_published {
        "Video is now published"
    } else {
        "Video is now unpublished"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(200, updated, message)))
}

pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))
}

struct UploadedFile {
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    duration: Option<f64>,
    video_file: Option<UploadedFile>,
    thumbnail: Option<UploadedFile>,
}

impl VideoForm {
    async fn read(mut payload: Multipart) -> Result<Self> {
        let mut form = VideoForm::default();

        while let Some(field) = payload.next().await {
            let mut field =
                field.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
            let content_type = field.content_type().to_string();

            match field.name() {
                "title" => form.title = Some(read_text(&mut field).await?),
                "description" => form.description = Some(read_text(&mut field).await?),
                "duration" => {
                    let raw = read_text(&mut field).await?;
                    let parsed = raw.trim().parse::<f64>().map_err(|_| {
                        AppError::BadRequest("Duration must be a number of seconds".to_string())
                    })?;
                    form.duration = Some(parsed);
                }
                "videoFile" => {
                    form.video_file = Some(UploadedFile {
                        bytes: read_bytes(&mut field).await?,
                        content_type,
                    })
                }
                "thumbnail" => {
                    form.thumbnail = Some(UploadedFile {
                        bytes: read_bytes(&mut field).await?,
                        content_type,
                    })
                }
                _ => {
                    // Ignore unknown fields
                }
            }
        }

        Ok(form)
    }
}

async fn read_bytes(field: &mut Field) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| AppError::BadRequest(format!("Upload read error: {}", e)))?;
        data.extend_from_slice(&bytes);
    }

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    Ok(data)
}

async fn read_text(field: &mut Field) -> Result<String> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| AppError::BadRequest(format!("Field read error: {}", e)))?;
        data.extend_from_slice(&bytes);
    }

    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_parsing_rejects_malformed_input() {
        assert!(parse_video_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_video_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn list_query_defaults_mirror_the_pagination_contract() {
        let q = VideoListQuery {
            page: None,
            limit: None,
            sort_by: None,
            sort_type: None,
            query: None,
            user_id: None,
        };
        let page = q.page_query();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
    }
}
