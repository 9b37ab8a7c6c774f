//! Shared value types for the mazerun engine.

mod types;

pub use types::{Direction, Position, RoundId};
