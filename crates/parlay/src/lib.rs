//! Parlay is a Parse-compatible REST server.
//!
//! # Features
//!
//! - Users: signup, password and third-party login, sessions
//! - Account policies: lockout, password expiry, email verification
//! - Password reset and verification emails through a pluggable adapter
//! - File storage through a pluggable adapter
//!
//! Persistence, files, email, and third-party login are adapters wired in
//! through [`AppBuilder`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from parlay-types
pub use parlay_types::auth_provider;
pub use parlay_types::database_adapter;
pub use parlay_types::email_adapter;
pub use parlay_types::error;
pub use parlay_types::files_adapter;
pub use parlay_types::pubsub_adapter;
pub use parlay_types::query;
pub use parlay_types::types;
pub use parlay_types::utils;
pub use parlay_types::worker;

// Feature crate re-exports
pub use parlay_core::config;
pub use parlay_file as file;
pub use parlay_users as users;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
