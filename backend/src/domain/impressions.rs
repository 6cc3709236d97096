//! Impression aggregation: a fixed seven-day like+comment histogram.
//!
//! The window covers today and the preceding six days (UTC calendar dates).
//! Post selection is gated on the *post's* creation timestamp, not on the
//! engagement event's date: a like made today on a post created ten days ago
//! contributes nothing because the post itself is out of range. Late
//! engagement on old posts is therefore undercounted; this is deliberate and
//! contractual.
//!
//! Likes carry no timestamp of their own. The date of a like event resolves
//! to the liking user's account creation timestamp; a like whose user record
//! cannot be resolved is skipped and counts towards nothing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;

use super::error::Error;
use super::ports::{
    ImpressionsQuery, PostStore, PostStoreError, UserStore, UserStoreError,
};
use super::user::UserId;

/// Number of daily buckets in the histogram, which is also the fixed divisor
/// for the average (even when some buckets predate the author's data).
pub const WINDOW_DAYS: usize = 7;

/// One calendar-day bucket of the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyImpressions {
    /// UTC calendar date of the bucket.
    pub date: NaiveDate,
    /// Like plus comment events on that date.
    pub count: usize,
}

/// Aggregated impressions for one author's recent posts.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpressionSummary {
    /// The seven buckets, oldest first.
    pub daily: Vec<DailyImpressions>,
    /// Like events landing in the window.
    pub total_likes: usize,
    /// Comment events landing in the window.
    pub total_comments: usize,
}

impl ImpressionSummary {
    /// Combined like and comment count.
    pub const fn total_impressions(&self) -> usize {
        self.total_likes + self.total_comments
    }

    /// Mean daily impressions over the fixed seven-day window.
    pub fn average_impressions(&self) -> f64 {
        #[expect(
            clippy::cast_precision_loss,
            reason = "engagement counts stay far below 2^52"
        )]
        let total = self.total_impressions() as f64;
        total / 7.0
    }
}

/// Aggregation service implementing [`ImpressionsQuery`] over the store ports.
#[derive(Clone)]
pub struct ImpressionService<P, U> {
    post_store: Arc<P>,
    user_store: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, U> ImpressionService<P, U> {
    /// Create a new service over the given stores.
    pub fn new(post_store: Arc<P>, user_store: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            post_store,
            user_store,
            clock,
        }
    }
}

fn map_post_store_error(error: PostStoreError) -> Error {
    Error::internal(format!("post store failure: {error}"))
}

fn map_user_store_error(error: UserStoreError) -> Error {
    Error::internal(format!("user store failure: {error}"))
}

#[async_trait]
impl<P, U> ImpressionsQuery for ImpressionService<P, U>
where
    P: PostStore,
    U: UserStore,
{
    async fn count_impressions(&self, author: &UserId) -> Result<ImpressionSummary, Error> {
        let now = self.clock.utc();
        let since = now - chrono::Duration::days(6);
        let today = now.date_naive();

        // Selection is gated on post creation, not engagement date.
        let posts = self
            .post_store
            .list_by_author_since(author, since)
            .await
            .map_err(map_post_store_error)?;

        let mut buckets: BTreeMap<NaiveDate, usize> = (0..WINDOW_DAYS as i64)
            .map(|offset| (today - chrono::Duration::days(offset), 0))
            .collect();

        let mut likers: Vec<UserId> = Vec::new();
        for post in &posts {
            for liker in &post.likes {
                if !likers.contains(liker) {
                    likers.push(*liker);
                }
            }
        }
        let registrations: HashMap<UserId, NaiveDate> = self
            .user_store
            .find_by_ids(&likers)
            .await
            .map_err(map_user_store_error)?
            .into_iter()
            .map(|user| (user.id, user.created_at.date_naive()))
            .collect();

        let mut total_likes = 0usize;
        let mut total_comments = 0usize;

        for post in &posts {
            for liker in &post.likes {
                // Unresolvable likers carry no date and are skipped entirely.
                let Some(date) = registrations.get(liker) else {
                    continue;
                };
                if let Some(count) = buckets.get_mut(date) {
                    *count += 1;
                    total_likes += 1;
                }
            }
            for comment in &post.comments {
                let date = comment.created_at.date_naive();
                if let Some(count) = buckets.get_mut(&date) {
                    *count += 1;
                    total_comments += 1;
                }
            }
        }

        Ok(ImpressionSummary {
            daily: buckets
                .into_iter()
                .map(|(date, count)| DailyImpressions { date, count })
                .collect(),
            total_likes,
            total_comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryPostStore, InMemoryUserStore, TestWorld, fixed_clock_at};
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        at("2026-03-14T12:00:00Z")
    }

    fn service(
        world: &TestWorld,
        now: DateTime<Utc>,
    ) -> ImpressionService<InMemoryPostStore, InMemoryUserStore> {
        ImpressionService::new(world.posts.clone(), world.users.clone(), fixed_clock_at(now))
    }

    #[rstest]
    #[tokio::test]
    async fn no_posts_yield_seven_zero_buckets(now: DateTime<Utc>) {
        let mut world = TestWorld::new();
        let author = world.add_user("author");

        let summary = service(&world, now)
            .count_impressions(&author)
            .await
            .expect("summary");

        assert_eq!(summary.daily.len(), WINDOW_DAYS);
        assert!(summary.daily.iter().all(|bucket| bucket.count == 0));
        assert_eq!(summary.total_impressions(), 0);
        assert_eq!(summary.average_impressions(), 0.0);
        assert_eq!(
            summary.daily.first().map(|b| b.date),
            Some(at("2026-03-08T00:00:00Z").date_naive())
        );
        assert_eq!(
            summary.daily.last().map(|b| b.date),
            Some(now.date_naive())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn buckets_sum_to_total_impressions(now: DateTime<Utc>) {
        let mut world = TestWorld::new();
        let author = world.add_user("author");
        let liker_today = world.add_user_at("today", now);
        let liker_midweek = world.add_user_at("midweek", at("2026-03-11T08:00:00Z"));
        let post = world.add_post_at(author, "recent", at("2026-03-12T09:00:00Z"));
        world.like(liker_today, post);
        world.like(liker_midweek, post);
        world.comment_at(post, liker_today, "nice", at("2026-03-13T10:00:00Z"));

        let summary = service(&world, now)
            .count_impressions(&author)
            .await
            .expect("summary");

        let bucket_sum: usize = summary.daily.iter().map(|bucket| bucket.count).sum();
        assert_eq!(bucket_sum, summary.total_impressions());
        assert_eq!(summary.total_likes, 2);
        assert_eq!(summary.total_comments, 1);
        assert_eq!(summary.average_impressions(), 3.0 / 7.0);
    }

    #[rstest]
    #[tokio::test]
    async fn old_posts_are_excluded_despite_fresh_engagement(now: DateTime<Utc>) {
        let mut world = TestWorld::new();
        let author = world.add_user("author");
        let liker = world.add_user_at("liker", now);
        // Created ten days before "now": outside the selection window.
        let stale = world.add_post_at(author, "stale", at("2026-03-04T09:00:00Z"));
        world.like(liker, stale);
        world.comment_at(stale, liker, "late comment", now);

        let summary = service(&world, now)
            .count_impressions(&author)
            .await
            .expect("summary");
        assert_eq!(summary.total_impressions(), 0);
        assert!(summary.daily.iter().all(|bucket| bucket.count == 0));
    }

    #[rstest]
    #[tokio::test]
    async fn out_of_window_event_dates_are_dropped_silently(now: DateTime<Utc>) {
        let mut world = TestWorld::new();
        let author = world.add_user("author");
        // Account registered long before the window: the like event's date
        // falls outside every bucket.
        let veteran = world.add_user_at("veteran", at("2023-01-01T00:00:00Z"));
        let post = world.add_post_at(author, "recent", at("2026-03-12T09:00:00Z"));
        world.like(veteran, post);

        let summary = service(&world, now)
            .count_impressions(&author)
            .await
            .expect("summary");
        assert_eq!(summary.total_impressions(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn unresolvable_likers_are_skipped(now: DateTime<Utc>) {
        let mut world = TestWorld::new();
        let author = world.add_user("author");
        let ghost = world.add_user_at("ghost", now);
        let post = world.add_post_at(author, "recent", at("2026-03-12T09:00:00Z"));
        world.like(ghost, post);
        world.remove_user(ghost);

        let summary = service(&world, now)
            .count_impressions(&author)
            .await
            .expect("summary");
        assert_eq!(summary.total_impressions(), 0);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(7, 1.0)]
    #[case(10, 10.0 / 7.0)]
    fn average_uses_the_fixed_divisor(#[case] total: usize, #[case] expected: f64) {
        let summary = ImpressionSummary {
            daily: Vec::new(),
            total_likes: total,
            total_comments: 0,
        };
        assert_eq!(summary.average_impressions(), expected);
    }
}
