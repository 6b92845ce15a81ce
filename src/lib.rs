//! Gridclip application: the log-cache proxy and its tooling.
//!
//! Library crates under `crates/` hold the codec, chain boundary, player
//! engine, and persistence; this crate wires them into a running service:
//! configuration, the three-tier log cache reconciliation, and the HTTP
//! server.

pub mod cache;
pub mod config;
pub mod server;
