//! Repositories for the Courier stores
//!
//! Each store is a trait plus an SQL implementation. The traits let the
//! message and push logic run against in-memory fakes in tests while the
//! backend wires up the SQL implementations.

pub mod message;
pub mod message_sql;
pub mod subscription;
pub mod subscription_sql;
pub mod user_sql;

pub use message::MessageRepository;
pub use message_sql::SqlMessageRepository;
pub use subscription::PushSubscriptionRepository;
pub use subscription_sql::SqlPushSubscriptionRepository;
pub use user_sql::SqlUserDirectory;
