//! Chatlab — Dialogue engine.
//!
//! Loads condition-parameterized scripts, resolves each turn's text for the
//! assigned arm, and walks a cursor through the script, halting whenever a
//! question needs an answer.

pub mod domain;
