//! Maze kernel: maze generation, movement rules, fog of war and the round engine.
//!
//! # Invariants
//! - Every generated maze is perfect: open passages form a spanning tree.
//! - Walls are cleared in pairs, so movement is symmetric between neighbours.
//! - Round state only changes through explicit operations, each logged as an event.

pub mod config;
pub mod engine;
pub mod fog;
pub mod maze;
pub mod trail;

pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineError, MazeEngine, MoveOutcome, Outcome, RoundEvent, RoundState, Snapshot};
pub use fog::{CellVisibility, FOG_FLOOR, FogField, is_within_sight, visibility};
pub use maze::{Cell, MAX_MAZE_SIZE, Maze, MazeError, can_move};
pub use trail::{Trail, age_fraction};
