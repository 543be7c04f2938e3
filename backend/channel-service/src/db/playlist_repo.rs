use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError};
use crate::models::{Playlist, PlaylistView, UserSummary, Video};
use crate::utils::pagination::PageQuery;

const SORT_WHITELIST: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
    ("name", "name"),
];

pub async fn create_playlist(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Playlist, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, Playlist>(
        r#"
        INSERT INTO playlists (id, name, description, owner_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, name, description, owner_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(owner_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Playlist>, sqlx::Error> {
    sqlx::query_as::<_, Playlist>(
        r#"
        SELECT id, name, description, owner_id, created_at, updated_at
        FROM playlists
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
    page: &PageQuery,
) -> Result<(Vec<Playlist>, i64), sqlx::Error> {
    let order_by = page.order_by(SORT_WHITELIST, "created_at");

    let sql = format!(
        r#"
        SELECT id, name, description, owner_id, created_at, updated_at
        FROM playlists
        WHERE owner_id = $1
        ORDER BY {}
        LIMIT $2 OFFSET $3
        "#,
        order_by
    );

    let playlists = sqlx::query_as::<_, Playlist>(&sql)
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let total_row = sqlx::query("SELECT COUNT(*) AS count FROM playlists WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    Ok((playlists, total_row.get::<i64, _>("count")))
}

/// Playlist detail view: owner denormalized, member video ids expanded into
/// full video rows in stored order. Stale references to deleted videos are
/// dropped by the inner join, not reported.
pub async fn get_view(pool: &PgPool, id: Uuid) -> Result<Option<PlaylistView>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT p.id, p.name, p.description, p.created_at, p.updated_at,
               u.id AS owner_id, u.username AS owner_username, u.avatar_url AS owner_avatar_url
        FROM playlists p
        JOIN users u ON u.id = p.owner_id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let videos = expand_videos(pool, id).await?;

    Ok(Some(PlaylistView {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        owner: UserSummary {
            id: row.get("owner_id"),
            username: row.get("owner_username"),
            avatar_url: row.get("owner_avatar_url"),
        },
        videos,
    }))
}

async fn expand_videos(pool: &PgPool, playlist_id: Uuid) -> Result<Vec<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT v.id, v.owner_id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at, v.updated_at
        FROM playlist_videos pv
        JOIN videos v ON v.id = pv.video_id
        WHERE pv.playlist_id = $1
        ORDER BY pv.position
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await
}

pub async fn update_playlist(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Playlist, sqlx::Error> {
    sqlx::query_as::<_, Playlist>(
        r#"
        UPDATE playlists SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, owner_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn delete_playlist(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let res = sqlx::query("DELETE FROM playlists WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(res.rows_affected() > 0)
}

/// Append a video at the end of the ordered sequence. Duplicate membership
/// trips the composite primary key and surfaces as a conflict.
pub async fn add_video(pool: &PgPool, playlist_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO playlist_videos (playlist_id, video_id, position)
        SELECT $1, $2, COALESCE(MAX(position) + 1, 0)
        FROM playlist_videos
        WHERE playlist_id = $1
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Video is already in playlist".to_string())
        } else {
            e.into()
        }
    })?;

    Ok(())
}

/// Remove a member video. Absence is reported as a not-found-in-collection
/// condition, distinct from the playlist itself being missing.
pub async fn remove_video(pool: &PgPool, playlist_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
    let res = sqlx::query(
        "DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2",
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(pool)
    .await
    .map_err(AppError::from)?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Video not found in playlist".to_string()));
    }

    Ok(())
}

/// Member video ids in stored order (no expansion).
pub async fn member_video_ids(pool: &PgPool, playlist_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT video_id FROM playlist_videos WHERE playlist_id = $1 ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|r| r.get::<Uuid, _>("video_id")).collect())
}
