//! Input mapping: raw key names to engine actions.
//!
//! # Invariants
//! - The engine consumes actions, never raw key events.
//! - Arrow keys and WASD map to the same moves.

pub mod action;

pub use action::{Action, InputMapper};
