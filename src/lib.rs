// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod clan;
pub mod config;
pub mod draft;
pub mod profile;
pub mod session;
pub mod stats;
pub mod tui;
