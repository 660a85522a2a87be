//! Video-game sales dashboard.
//!
//! The [`data`] layer loads and queries the sales table, [`engine`] turns
//! user requests into queries, and the shells ([`console`] plus the egui
//! viewer in the `vgsales-viewer` binary) render the results.

pub mod config;
pub mod console;
pub mod data;
pub mod engine;
