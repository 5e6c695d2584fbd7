//! Domain model for sessions.

pub mod aggregates;
pub mod commands;
pub mod survey;
