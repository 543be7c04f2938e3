/// Like edge repository. An edge is keyed by (actor, target kind, target id);
/// partial unique indexes on the likes table make duplicate edges impossible
/// even when toggles race, so a concurrent double-create surfaces as a
/// conflict instead of silently duplicating.
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::ToggleOutcome;
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::{Like, LikeTarget, LikedVideoEntry, Video};
use crate::utils::pagination::PageQuery;

const LIKE_COLUMNS: &str = "id, video_id, comment_id, tweet_id, liked_by, created_at";

pub async fn find_like(
    pool: &PgPool,
    liked_by: Uuid,
    target: LikeTarget,
) -> Result<Option<Like>> {
    let sql = format!(
        "SELECT {} FROM likes WHERE liked_by = $1 AND {} = $2",
        LIKE_COLUMNS,
        target.column()
    );

    let like = sqlx::query_as::<_, Like>(&sql)
        .bind(liked_by)
        .bind(target.id())
        .fetch_optional(pool)
        .await?;

    Ok(like)
}

async fn create_like(pool: &PgPool, liked_by: Uuid, target: LikeTarget) -> Result<Like> {
    let sql = format!(
        "INSERT INTO likes (id, liked_by, {}) VALUES ($1, $2, $3) RETURNING {}",
        target.column(),
        LIKE_COLUMNS
    );

    sqlx::query_as::<_, Like>(&sql)
        .bind(Uuid::new_v4())
        .bind(liked_by)
        .bind(target.id())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::warn!(
                    "Concurrent like toggle lost the race: {} already likes {} {}",
                    liked_by,
                    target.kind(),
                    target.id()
                );
                AppError::Conflict(format!("You have already liked this {}", target.kind()))
            } else {
                e.into()
            }
        })
}

async fn delete_like(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM likes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(AppError::from)?;

    Ok(())
}

/// Flip the existence of the (actor, target) edge: delete it when present,
/// create it otherwise.
pub async fn toggle(pool: &PgPool, liked_by: Uuid, target: LikeTarget) -> Result<ToggleOutcome<Like>> {
    match find_like(pool, liked_by, target).await? {
        Some(existing) => {
            delete_like(pool, existing.id).await?;
            Ok(ToggleOutcome::Removed)
        }
        None => {
            let like = create_like(pool, liked_by, target).await?;
            Ok(ToggleOutcome::Created(like))
        }
    }
}

/// Videos the actor has liked, newest like first, with the video row joined
/// in. Likes pointing at deleted videos are excluded by the join.
pub async fn list_liked_videos(
    pool: &PgPool,
    liked_by: Uuid,
    page: &PageQuery,
) -> Result<(Vec<LikedVideoEntry>, i64)> {
    let rows = sqlx::query(
        r#"
        SELECT l.id AS like_id, l.liked_by, l.created_at AS liked_at,
               v.id, v.owner_id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at, v.updated_at
        FROM likes l
        JOIN videos v ON v.id = l.video_id
        WHERE l.liked_by = $1 AND l.video_id IS NOT NULL
        ORDER BY l.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(liked_by)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total_row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM likes l
        JOIN videos v ON v.id = l.video_id
        WHERE l.liked_by = $1 AND l.video_id IS NOT NULL
        "#,
    )
    .bind(liked_by)
    .fetch_one(pool)
    .await?;

    let items = rows
        .iter()
        .map(|r| LikedVideoEntry {
            id: r.get("like_id"),
            liked_by: r.get("liked_by"),
            created_at: r.get("liked_at"),
            video: Video {
                id: r.get("id"),
                owner_id: r.get("owner_id"),
                title: r.get("title"),
                description: r.get("description"),
                video_url: r.get("video_url"),
                thumbnail_url: r.get("thumbnail_url"),
                duration: r.get("duration"),
                views: r.get("views"),
                is_published: r.get("is_published"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            },
        })
        .collect();

    Ok((items, total_row.get::<i64, _>("count")))
}
