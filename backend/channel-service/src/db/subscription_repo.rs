/// Subscription edge repository (subscriber → channel). The UNIQUE
/// (subscriber_id, channel_id) constraint closes the check-then-insert race;
/// the CHECK constraint backs up the application-level self-subscription
/// rejection.
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::ToggleOutcome;
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::{SubscribedChannelEntry, Subscription, SubscriberEntry, UserSummary};
use crate::utils::pagination::PageQuery;

pub async fn find_subscription(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<Option<Subscription>> {
    let subscription = sqlx::query_as::<_, Subscription>(
        r#"
        SELECT id, subscriber_id, channel_id, created_at
        FROM subscriptions
        WHERE subscriber_id = $1 AND channel_id = $2
        "#,
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_optional(pool)
    .await?;

    Ok(subscription)
}

async fn create_subscription(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, subscriber_id, channel_id)
        VALUES ($1, $2, $3)
        RETURNING id, subscriber_id, channel_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            tracing::warn!(
                "Concurrent subscription toggle lost the race: {} -> {}",
                subscriber_id,
                channel_id
            );
            AppError::Conflict("You are already subscribed to this channel".to_string())
        } else {
            e.into()
        }
    })
}

pub async fn toggle(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<ToggleOutcome<Subscription>> {
    if subscriber_id == channel_id {
        return Err(AppError::BadRequest(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    match find_subscription(pool, subscriber_id, channel_id).await? {
        Some(existing) => {
            sqlx::query("DELETE FROM subscriptions WHERE id = $1")
                .bind(existing.id)
                .execute(pool)
                .await
                .map_err(AppError::from)?;
            Ok(ToggleOutcome::Removed)
        }
        None => {
            let subscription = create_subscription(pool, subscriber_id, channel_id).await?;
            Ok(ToggleOutcome::Created(subscription))
        }
    }
}

/// Subscribers of a channel, subscriber profile denormalized.
pub async fn list_subscribers(
    pool: &PgPool,
    channel_id: Uuid,
    page: &PageQuery,
) -> Result<(Vec<SubscriberEntry>, i64)> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.created_at,
               u.id AS subscriber_id, u.username AS subscriber_username,
               u.avatar_url AS subscriber_avatar_url
        FROM subscriptions s
        JOIN users u ON u.id = s.subscriber_id
        WHERE s.channel_id = $1
        ORDER BY s.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(channel_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total_row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM subscriptions s
        JOIN users u ON u.id = s.subscriber_id
        WHERE s.channel_id = $1
        "#,
    )
    .bind(channel_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .iter()
        .map(|r| SubscriberEntry {
            id: r.get("id"),
            created_at: r.get("created_at"),
            subscriber: UserSummary {
                id: r.get("subscriber_id"),
                username: r.get("subscriber_username"),
                avatar_url: r.get("subscriber_avatar_url"),
            },
        })
        .collect();

    Ok((items, total_row.get::<i64, _>("count")))
}

/// Channels the user is subscribed to, channel profile denormalized.
pub async fn list_subscribed_channels(
    pool: &PgPool,
    subscriber_id: Uuid,
    page: &PageQuery,
) -> Result<(Vec<SubscribedChannelEntry>, i64)> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.created_at,
               u.id AS channel_id, u.username AS channel_username,
               u.avatar_url AS channel_avatar_url
        FROM subscriptions s
        JOIN users u ON u.id = s.channel_id
        WHERE s.subscriber_id = $1
        ORDER BY s.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(subscriber_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total_row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM subscriptions s
        JOIN users u ON u.id = s.channel_id
        WHERE s.subscriber_id = $1
        "#,
    )
    .bind(subscriber_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .iter()
        .map(|r| SubscribedChannelEntry {
            id: r.get("id"),
            created_at: r.get("created_at"),
            channel: UserSummary {
                id: r.get("channel_id"),
                username: r.get("channel_username"),
                avatar_url: r.get("channel_avatar_url"),
            },
        })
        .collect();

    Ok((items, total_row.get::<i64, _>("count")))
}
