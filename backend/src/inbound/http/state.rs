//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EngagementCommand, FeedQuery, ImpressionsQuery, SocialGraphQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Post query engine.
    pub feed: Arc<dyn FeedQuery>,
    /// Engagement mutators.
    pub engagement: Arc<dyn EngagementCommand>,
    /// Impression aggregator.
    pub impressions: Arc<dyn ImpressionsQuery>,
    /// Social graph accessor.
    pub social: Arc<dyn SocialGraphQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Post query engine.
    pub feed: Arc<dyn FeedQuery>,
    /// Engagement mutators.
    pub engagement: Arc<dyn EngagementCommand>,
    /// Impression aggregator.
    pub impressions: Arc<dyn ImpressionsQuery>,
    /// Social graph accessor.
    pub social: Arc<dyn SocialGraphQuery>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{
    ///     FixtureEngagementCommand, FixtureFeedQuery, FixtureImpressionsQuery,
    ///     FixtureSocialGraphQuery,
    /// };
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     feed: Arc::new(FixtureFeedQuery),
    ///     engagement: Arc::new(FixtureEngagementCommand),
    ///     impressions: Arc::new(FixtureImpressionsQuery),
    ///     social: Arc::new(FixtureSocialGraphQuery),
    /// });
    /// let _feed = state.feed.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            feed,
            engagement,
            impressions,
            social,
        } = ports;
        Self {
            feed,
            engagement,
            impressions,
            social,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
