//! Rendering adapter: renderer-agnostic interface over engine snapshots.
//!
//! # Invariants
//! - Renderers cannot mutate the engine; they read a `Snapshot`.
//! - Opacity derives from the snapshot's fog field.

mod renderer;

pub use renderer::{DebugTextRenderer, DrawCommand, DrawListRenderer, Renderer, WallStyle};
