//! Chatlab API — HTTP host for scripted-chat experiment sessions.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
