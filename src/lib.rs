//! Microblogging social backend — posts, follows, likes, bookmarks, and
//! messages over SQLite, exposed as a REST API.
//!
//! Roost stores a small social graph and keeps the denormalized per-post
//! reaction counters (`like_count`, `dislike_count`, `bookmark_count`)
//! exactly in sync with the underlying relation records. The toggle engine
//! in [`social::toggle`] is the only writer of those counters during normal
//! operation; account deletion and the `repair` command are the two other
//! sanctioned writers.
//!
//! # Architecture
//!
//! - **Storage**: SQLite in WAL mode via `rusqlite`, one schema batch plus
//!   forward-only migrations
//! - **Domain engine**: [`social`] — relation store, toggle orchestrator,
//!   users, posts, follows, messages
//! - **Transport**: axum REST API under `/api`; the session collaborator's
//!   resolved identity arrives in the `x-user-id` header
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`social`] — Core social engine: relations, toggles, users, posts,
//!   follows, and messages
//! - [`api`] — axum handlers per resource
//! - [`server`] — router assembly and the serve entry point

pub mod api;
pub mod config;
pub mod db;
pub mod server;
pub mod social;
