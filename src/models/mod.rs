//! Core data models for the squad tracker.

mod identity;
mod match_record;
mod performance;
mod roster;

pub use identity::*;
pub use match_record::*;
pub use performance::*;
pub use roster::*;
