//! Domain model for the dialogue engine.

pub mod condition;
pub mod cursor;
pub mod design;
pub mod resolver;
pub mod script;
pub mod turn;
