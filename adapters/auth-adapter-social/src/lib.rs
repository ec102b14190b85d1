//! Third-party login providers validating `authData` against the identity
//! provider: Apple Sign-In ID tokens and LinkedIn OAuth access tokens.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod http;

pub mod apple;
pub mod linkedin;

pub use apple::{AppleClaims, AppleOptions, AppleProvider, JwksCache};
pub use linkedin::{LinkedInOptions, LinkedInProvider};

// vim: ts=4
