pub mod cache;
pub mod matches;
pub mod performance;
pub mod players;
