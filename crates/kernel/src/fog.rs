//! Distance-based fog of war.
//!
//! Visibility is computed from straight-line distance between cell positions.
//! Walls do not occlude; the field is cheap enough to rebuild every frame.

use mazerun_common::Position;
use serde::Serialize;

/// Lowest visibility any cell reaches. Keeps distant geometry faintly legible.
pub const FOG_FLOOR: f32 = 0.1;

/// Visibility of `cell` as seen from `player`, in `[FOG_FLOOR, 1.0]`.
///
/// Fully lit up to `radius - 1`, a linear ramp across the next two cells,
/// then flat at [`FOG_FLOOR`].
pub fn visibility(cell: Position, player: Position, radius: f32) -> f32 {
    let d = cell.distance(player);
    if d <= radius - 1.0 {
        1.0
    } else if d <= radius + 1.0 {
        (1.0 - (d - (radius - 1.0)) / 2.0).max(FOG_FLOOR)
    } else {
        FOG_FLOOR
    }
}

/// Whether `cell` is close enough to draw markers on (exit, breadcrumbs).
pub fn is_within_sight(cell: Position, player: Position, radius: f32) -> bool {
    cell.distance(player) <= radius + 1.0
}

/// A cell and its visibility value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellVisibility {
    pub pos: Position,
    pub visibility: f32,
}

/// Visibility for every cell of a grid, for one player position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FogField {
    size: usize,
    player: Position,
    radius: f32,
    values: Vec<f32>,
}

impl FogField {
    pub fn compute(size: usize, player: Position, radius: f32) -> Self {
        let values = (0..size * size)
            .map(|i| visibility(Position::new(i % size, i / size), player, radius))
            .collect();
        Self {
            size,
            player,
            radius,
            values,
        }
    }

    /// Visibility at `pos`; cells off the grid read as [`FOG_FLOOR`].
    pub fn value(&self, pos: Position) -> f32 {
        if pos.x >= self.size || pos.y >= self.size {
            return FOG_FLOOR;
        }
        self.values[pos.y * self.size + pos.x]
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Cells within sight of the player, row by row.
    pub fn visible_cells(&self) -> impl Iterator<Item = CellVisibility> + '_ {
        self.values.iter().enumerate().filter_map(|(i, &value)| {
            let pos = Position::new(i % self.size, i / self.size);
            if !is_within_sight(pos, self.player, self.radius) {
                return None;
            }
            Some(CellVisibility {
                pos,
                visibility: value,
            })
        })
    }
}
