//! Chatlab Core — shared domain abstractions.
//!
//! This crate defines the error taxonomy, the determinism seams (clock and
//! RNG), the command trait, and the port through which completed sessions
//! leave the engine. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod rng;
pub mod sink;
