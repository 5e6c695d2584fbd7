//! Chatlab — Session & Completion bounded context.
//!
//! Responsible for condition assignment, transcript accumulation, reply
//! gating, and handing completed sessions to the session sink.

pub mod application;
pub mod domain;
