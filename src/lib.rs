// ABOUTME: Library root for tunnelfleet - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lifecycle;
pub mod output;
pub mod render;
pub mod runtime;
pub mod topology;
pub mod types;
