//! Session sinks for the Chatlab experiment engine.
//!
//! Completed sessions go to PostgreSQL when configured, with an append-only
//! CSV file as the local fallback.

pub mod csv_session_sink;
pub mod fallback;
pub mod pg_session_sink;
pub mod schema;
