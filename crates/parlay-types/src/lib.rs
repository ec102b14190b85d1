//! Shared types, adapter traits, and core utilities for the Parlay server.
//!
//! This crate contains the foundational types that are shared between the
//! server crates and all adapter implementations. Adapters depend on this
//! crate only, so they compile in parallel with the feature crates.

pub mod auth_provider;
pub mod database_adapter;
pub mod email_adapter;
pub mod error;
pub mod files_adapter;
pub mod prelude;
pub mod pubsub_adapter;
pub mod query;
pub mod types;
pub mod utils;
pub mod worker;

// vim: ts=4
