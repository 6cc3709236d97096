//! Social engagement backend.
//!
//! REST API for a small social application: posts with embedded comments,
//! like/repost/bookmark reference sets, a following feed, and the dashboard
//! aggregations (seven-day impression histogram, follower counts). Laid out
//! as a hexagon: `domain` holds entities, services, and ports; `inbound`
//! adapts HTTP onto the driving ports; `outbound` implements the driven
//! ports against PostgreSQL and the external media host.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use middleware::Trace;
