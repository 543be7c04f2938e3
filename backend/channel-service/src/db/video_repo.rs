use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{UserSummary, Video, VideoWithOwner};
use crate::utils::pagination::PageQuery;

/// Sort fields callers may request on video listings, mapped to columns.
const SORT_WHITELIST: &[(&str, &str)] = &[
    ("createdAt", "v.created_at"),
    ("updatedAt", "v.updated_at"),
    ("title", "v.title"),
    ("duration", "v.duration"),
    ("views", "v.views"),
];

/// Filter applied before the owner join on the listing view.
#[derive(Debug, Default, Clone)]
pub struct VideoFilter {
    /// Case-insensitive substring match on the title.
    pub query: Option<String>,
    pub owner_id: Option<Uuid>,
}

pub async fn create_video(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    description: &str,
    duration: f64,
    video_url: &str,
    thumbnail_url: &str,
) -> Result<Video, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (id, owner_id, title, description, video_url, thumbnail_url,
                            duration, views, is_published, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, TRUE, $8, $8)
        RETURNING id, owner_id, title, description, video_url, thumbnail_url,
                  duration, views, is_published, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(duration)
    .bind(video_url)
    .bind(thumbnail_url)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        SELECT id, owner_id, title, description, video_url, thumbnail_url,
               duration, views, is_published, created_at, updated_at
        FROM videos
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Single video with its owner denormalized. The join is inner: a video whose
/// owner row is gone resolves to nothing.
pub async fn get_with_owner(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<VideoWithOwner>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at, v.updated_at,
               u.id AS owner_id, u.username AS owner_username, u.avatar_url AS owner_avatar_url
        FROM videos v
        JOIN users u ON u.id = v.owner_id
        WHERE v.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| video_with_owner_from_row(&r)))
}

/// Filtered, sorted, paginated listing with the owner joined in. Returns the
/// page slice and the total match count.
pub async fn list(
    pool: &PgPool,
    filter: &VideoFilter,
    page: &PageQuery,
) -> Result<(Vec<VideoWithOwner>, i64), sqlx::Error> {
    let order_by = page.order_by(SORT_WHITELIST, "v.created_at");

    let sql = format!(
        r#"
        SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
               v.duration, v.views, v.is_published, v.created_at, v.updated_at,
               u.id AS owner_id, u.username AS owner_username, u.avatar_url AS owner_avatar_url
        FROM videos v
        JOIN users u ON u.id = v.owner_id
        WHERE ($1::text IS NULL OR v.title ILIKE '%' || $1 || '%')
          AND ($2::uuid IS NULL OR v.owner_id = $2)
        ORDER BY {}
        LIMIT $3 OFFSET $4
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(filter.query.as_deref())
        .bind(filter.owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let total_row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM videos v
        JOIN users u ON u.id = v.owner_id
        WHERE ($1::text IS NULL OR v.title ILIKE '%' || $1 || '%')
          AND ($2::uuid IS NULL OR v.owner_id = $2)
        "#,
    )
    .bind(filter.query.as_deref())
    .bind(filter.owner_id)
    .fetch_one(pool)
    .await?;

    let items = rows.iter().map(video_with_owner_from_row).collect();
    Ok((items, total_row.get::<i64, _>("count")))
}

/// Update mutable metadata. Absent values leave the stored column untouched.
pub async fn update_video(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    thumbnail_url: Option<&str>,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        UPDATE videos SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            thumbnail_url = COALESCE($4, thumbnail_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, title, description, video_url, thumbnail_url,
                  duration, views, is_published, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(thumbnail_url)
    .fetch_one(pool)
    .await
}

pub async fn set_published(
    pool: &PgPool,
    id: Uuid,
    is_published: bool,
) -> Result<Video, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        r#"
        UPDATE videos SET is_published = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, owner_id, title, description, video_url, thumbnail_url,
                  duration, views, is_published, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(is_published)
    .fetch_one(pool)
    .await
}

pub async fn delete_video(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected() > 0)
}

fn video_with_owner_from_row(row: &sqlx::postgres::PgRow) -> VideoWithOwner {
    VideoWithOwner {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        video_url: row.get("video_url"),
        thumbnail_url: row.get("thumbnail_url"),
        duration: row.get("duration"),
        views: row.get("views"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        owner: UserSummary {
            id: row.get("owner_id"),
            username: row.get("owner_username"),
            avatar_url: row.get("owner_avatar_url"),
        },
    }
}
