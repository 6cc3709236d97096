//! PostgreSQL persistence adapters for the domain's driven ports.

pub mod diesel_notification_outbox;
pub mod diesel_post_store;
pub mod diesel_user_store;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_notification_outbox::DieselNotificationOutbox;
pub use diesel_post_store::DieselPostStore;
pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
