use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub content: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A like edge. Exactly one of the target columns is set; the schema enforces
/// both the shape and the per-(actor, target) uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub id: Uuid,
    pub video_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub tweet_id: Option<Uuid>,
    pub liked_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The target of a like edge. The column name is drawn from a closed set, so
/// repositories can splice it into SQL without any injection surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }
}

/// Public owner projection embedded in video, comment, playlist and
/// subscription views. Never carries credential fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Owner projection for tweet views, which additionally expose the full name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCard {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoWithOwner {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentWithOwner {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TweetWithOwner {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: UserCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserSummary,
    /// Member videos in stored order; stale references to deleted videos are
    /// dropped during expansion.
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriberEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub subscriber: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribedChannelEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub channel: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedVideoEntry {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub video: Video,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_target_column_matches_kind() {
        let id = Uuid::new_v4();
        assert_eq!(LikeTarget::Video(id).column(), "video_id");
        assert_eq!(LikeTarget::Comment(id).column(), "comment_id");
        assert_eq!(LikeTarget::Tweet(id).column(), "tweet_id");
        assert_eq!(LikeTarget::Tweet(id).kind(), "tweet");
        assert_eq!(LikeTarget::Video(id).id(), id);
    }

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "casey".into(),
            email: "casey@example.com".into(),
            full_name: "Casey Park".into(),
            avatar_url: None,
            cover_image_url: None,
            password_hash: "secret".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "casey");
    }
}
