use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Tweet, TweetWithOwner, UserCard};
use crate::utils::pagination::PageQuery;

const SORT_WHITELIST: &[(&str, &str)] = &[("createdAt", "t.created_at"), ("updatedAt", "t.updated_at")];

pub async fn create_tweet(
    pool: &PgPool,
    owner_id: Uuid,
    content: &str,
) -> Result<Tweet, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, Tweet>(
        r#"
        INSERT INTO tweets (id, content, owner_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING id, content, owner_id, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(content)
    .bind(owner_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Tweet>, sqlx::Error> {
    sqlx::query_as::<_, Tweet>(
        r#"
        SELECT id, content, owner_id, created_at, updated_at
        FROM tweets
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Tweets of one author, author card denormalized.
pub async fn list_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
    page: &PageQuery,
) -> Result<(Vec<TweetWithOwner>, i64), sqlx::Error> {
    let order_by = page.order_by(SORT_WHITELIST, "t.created_at");

    let sql = format!(
        r#"
        SELECT t.id, t.content, t.created_at,
               u.id AS owner_id, u.username AS owner_username,
               u.full_name AS owner_full_name, u.avatar_url AS owner_avatar_url
        FROM tweets t
        JOIN users u ON u.id = t.owner_id
        WHERE t.owner_id = $1
        ORDER BY {}
        LIMIT $2 OFFSET $3
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let total_row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM tweets t
        JOIN users u ON u.id = t.owner_id
        WHERE t.owner_id = $1
        "#,
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .iter()
        .map(|r| TweetWithOwner {
            id: r.get("id"),
            content: r.get("content"),
            created_at: r.get("created_at"),
            owner: UserCard {
                id: r.get("owner_id"),
                username: r.get("owner_username"),
                full_name: r.get("owner_full_name"),
                avatar_url: r.get("owner_avatar_url"),
            },
        })
        .collect();

    Ok((items, total_row.get::<i64, _>("count")))
}

pub async fn update_content(pool: &PgPool, id: Uuid, content: &str) -> Result<Tweet, sqlx::Error> {
    sqlx::query_as::<_, Tweet>(
        r#"
        UPDATE tweets SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, content, owner_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(content)
    .fetch_one(pool)
    .await
}

pub async fn delete_tweet(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM tweets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected() > 0)
}
