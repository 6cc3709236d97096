//! Engagement notifications.
//!
//! Notifications are emitted as a side effect of like and repost mutations
//! and handed to a [`crate::domain::ports::NotificationOutbox`]. This core
//! never reads them back; delivery is a downstream consumer's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Kind of engagement that triggered the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A user liked the recipient's post.
    Like,
    /// A user reposted the recipient's post.
    Repost,
}

impl NotificationKind {
    /// Stable string form used by the persistence layer.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Repost => "repost",
        }
    }
}

/// Notification record emitted towards a post's author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Stable notification identifier.
    pub id: Uuid,
    /// Acting user.
    pub from: UserId,
    /// Receiving user.
    pub to: UserId,
    /// Engagement kind.
    pub kind: NotificationKind,
    /// Emission timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification of the given kind.
    pub fn new(from: UserId, to: UserId, kind: NotificationKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            kind,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_has_stable_string_form() {
        assert_eq!(NotificationKind::Like.as_str(), "like");
        assert_eq!(NotificationKind::Repost.as_str(), "repost");
    }

    #[test]
    fn new_assigns_distinct_ids() {
        let from = UserId::random();
        let to = UserId::random();
        let now = Utc::now();
        let a = Notification::new(from, to, NotificationKind::Like, now);
        let b = Notification::new(from, to, NotificationKind::Like, now);
        assert_ne!(a.id, b.id);
    }
}
