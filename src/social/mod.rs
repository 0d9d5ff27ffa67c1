pub mod error;
pub mod follows;
pub mod messages;
pub mod posts;
pub mod relations;
pub mod toggle;
pub mod types;
pub mod users;
