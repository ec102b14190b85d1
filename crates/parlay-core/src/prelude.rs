pub use crate::app::App;
pub use parlay_types::prelude::*;

// vim: ts=4
