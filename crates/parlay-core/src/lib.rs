//! Core infrastructure for the Parlay server.
//!
//! Configuration, the shared application state, and the services the HTTP
//! routers build on: password hashing, account lockout, sessions, the user
//! controller (verification and reset emails), request extractors, and the
//! generic class CRUD capability.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod account_lockout;
pub mod app;
pub mod config;
pub mod extract;
pub mod password;
pub mod prelude;
pub mod rest;
pub mod session;
pub mod user_controller;

pub use app::{App, AppState};
pub use config::ServerConfig;
pub use extract::{AuthInfo, MasterAuth, RequestInfo, RestRequest};

// vim: ts=4
