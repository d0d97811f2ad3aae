// ABOUTME: Library root for deckhand - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod health;
pub mod invocation;
pub mod output;
pub mod runtime;
pub mod types;
