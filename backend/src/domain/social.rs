//! Social graph accessor.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Error;
use super::ports::{SocialGraphQuery, UserStore, UserStoreError};
use super::user::UserId;

/// Follower and following counts for one user.
///
/// The wire form is an ordered pair with followers first; the HTTP adapter
/// owns that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowCounts {
    /// Number of users following this user.
    pub followers: usize,
    /// Number of users this user follows.
    pub following: usize,
}

/// Query service implementing [`SocialGraphQuery`] over the user store.
#[derive(Clone)]
pub struct SocialGraphService<U> {
    user_store: Arc<U>,
}

impl<U> SocialGraphService<U> {
    /// Create a new service over the given store.
    pub fn new(user_store: Arc<U>) -> Self {
        Self { user_store }
    }
}

fn map_user_store_error(error: UserStoreError) -> Error {
    Error::internal(format!("user store failure: {error}"))
}

#[async_trait]
impl<U> SocialGraphQuery for SocialGraphService<U>
where
    U: UserStore,
{
    async fn follower_following_counts(&self, user: &UserId) -> Result<FollowCounts, Error> {
        let user = self
            .user_store
            .find_by_id(user)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        Ok(FollowCounts {
            followers: user.followers.len(),
            following: user.following.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::TestWorld;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn counts_reflect_both_reference_sets() {
        let mut world = TestWorld::new();
        let user = world.add_user("user");
        let fan_one = world.add_user("fan_one");
        let fan_two = world.add_user("fan_two");
        let idol = world.add_user("idol");
        world.follow(fan_one, user);
        world.follow(fan_two, user);
        world.follow(user, idol);

        let counts = SocialGraphService::new(world.users.clone())
            .follower_following_counts(&user)
            .await
            .expect("counts");
        assert_eq!(
            counts,
            FollowCounts {
                followers: 2,
                following: 1
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let world = TestWorld::new();
        let err = SocialGraphService::new(world.users.clone())
            .follower_following_counts(&UserId::random())
            .await
            .expect_err("unknown user");
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
