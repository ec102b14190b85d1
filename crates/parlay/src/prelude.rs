pub use parlay_core::prelude::*;

// vim: ts=4
