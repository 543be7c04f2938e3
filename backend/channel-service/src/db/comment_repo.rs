use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Comment, CommentWithOwner, UserSummary};
use crate::utils::pagination::PageQuery;

const SORT_WHITELIST: &[(&str, &str)] = &[("createdAt", "c.created_at"), ("updatedAt", "c.updated_at")];

pub async fn create_comment(
    pool: &PgPool,
    video_id: Uuid,
    owner_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, content, video_id, owner_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, content, video_id, owner_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(content)
    .bind(video_id)
    .bind(owner_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, content, video_id, owner_id, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Comments of a video with the author denormalized; authors that no longer
/// exist drop their comments from the view.
pub async fn list_for_video(
    pool: &PgPool,
    video_id: Uuid,
    page: &PageQuery,
) -> Result<(Vec<CommentWithOwner>, i64), sqlx::Error> {
    let order_by = page.order_by(SORT_WHITELIST, "c.created_at");

    let sql = format!(
        r#"
        SELECT c.id, c.content, c.created_at,
               u.id AS owner_id, u.username AS owner_username, u.avatar_url AS owner_avatar_url
        FROM comments c
        JOIN users u ON u.id = c.owner_id
        WHERE c.video_id = $1
        ORDER BY {}
        LIMIT $2 OFFSET $3
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(video_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let total_row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM comments c
        JOIN users u ON u.id = c.owner_id
        WHERE c.video_id = $1
        "#,
    )
    .bind(video_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .iter()
        .map(|r| CommentWithOwner {
            id: r.get("id"),
            content: r.get("content"),
            created_at: r.get("created_at"),
            owner: UserSummary {
                id: r.get("owner_id"),
                username: r.get("owner_username"),
                avatar_url: r.get("owner_avatar_url"),
            },
        })
        .collect();

    Ok((items, total_row.get::<i64, _>("count")))
}

pub async fn update_content(
    pool: &PgPool,
    id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, content, video_id, owner_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn delete_comment(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected() > 0)
}
