/// Uniform ownership authorization. Every owned entity exposes its actor
/// reference through `Owned`; mutating handlers resolve the entity first
/// (missing is a 404 before this runs) and then pass through one guard.
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, Playlist, Tweet, Video};

pub trait Owned {
    fn owner_id(&self) -> Uuid;

    /// Entity name used in the forbidden message ("video", "playlist", ...).
    fn entity_name(&self) -> &'static str;
}

impl Owned for Video {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name(&self) -> &'static str {
        "video"
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name(&self) -> &'static str {
        "comment"
    }
}

impl Owned for Tweet {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name(&self) -> &'static str {
        "tweet"
    }
}

impl Owned for Playlist {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn entity_name(&self) -> &'static str {
        "playlist"
    }
}

/// Ownership is all-or-nothing: the actor either is the owner or the
/// operation is forbidden.
pub fn ensure_owner<T: Owned>(actor_id: Uuid, entity: &T) -> Result<()> {
    if entity.owner_id() == actor_id {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "You are not allowed to modify this {}",
            entity.entity_name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tweet(owner_id: Uuid) -> Tweet {
        Tweet {
            id: Uuid::new_v4(),
            content: "hello".into(),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_passes_the_guard() {
        let owner = Uuid::new_v4();
        assert!(ensure_owner(owner, &tweet(owner)).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let result = ensure_owner(Uuid::new_v4(), &tweet(Uuid::new_v4()));
        match result {
            Err(AppError::Authorization(msg)) => {
                assert_eq!(msg, "You are not allowed to modify this tweet")
            }
            other => panic!("expected Authorization error, got {:?}", other),
        }
    }
}
