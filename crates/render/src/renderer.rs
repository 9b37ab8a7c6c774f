use mazerun_common::Position;
use mazerun_kernel::{
    FOG_FLOOR, RoundState, Snapshot, age_fraction, is_within_sight, visibility,
};

/// Stroke and fill opacities derived from a visibility value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallStyle;

impl WallStyle {
    /// Wall stroke alpha. Lit walls are drawn brighter than fogged ones.
    pub fn wall_alpha(visibility: f32) -> f32 {
        if visibility > 0.3 {
            0.25 * visibility
        } else {
            0.08 * visibility
        }
    }

    /// Breadcrumb alpha: newer points are stronger. `age` is 1.0 for the oldest.
    pub fn trail_alpha(age: f32, visibility: f32) -> f32 {
        (1.0 - age) * 0.6 * visibility
    }
}

/// Renderer-agnostic interface. Renderers read a snapshot and never touch the engine.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, snapshot: &Snapshot<'_>) -> Self::Output;
}

/// Plain-text frame renderer for terminals, logs and tests.
///
/// Walls are `+---+` and `|`, the player `@`, the exit `E` and breadcrumbs `.`.
/// With fog shading on, cells at the fog floor are filled with `:`.
#[derive(Debug)]
pub struct DebugTextRenderer {
    pub fog_shading: bool,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self { fog_shading: true }
    }

    /// A renderer that draws the whole maze without fog.
    pub fn unfogged() -> Self {
        Self { fog_shading: false }
    }

    fn cell_glyph(&self, snapshot: &Snapshot<'_>, pos: Position, exit: Position) -> char {
        let radius = snapshot.fog.as_ref().map_or(f32::INFINITY, |f| f.radius());
        if pos == snapshot.player {
            '@'
        } else if pos == exit && (!self.fog_shading || snapshot.exit_visibility.is_some()) {
            'E'
        } else if snapshot.trail.contains(&pos)
            && (!self.fog_shading || is_within_sight(pos, snapshot.player, radius))
        {
            '.'
        } else if self.fog_shading
            && snapshot
                .fog
                .as_ref()
                .is_some_and(|f| f.value(pos) <= FOG_FLOOR)
        {
            ':'
        } else {
            ' '
        }
    }
}

fn state_label(state: RoundState) -> String {
    match state {
        RoundState::Idle => "idle".into(),
        RoundState::Playing => "playing".into(),
        RoundState::Ended(outcome) => format!("ended ({outcome:?})"),
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, snapshot: &Snapshot<'_>) -> String {
        let mut out = format!(
            "=== Maze (state={}, t={:.1}s) ===\n",
            state_label(snapshot.state),
            snapshot.timer()
        );
        let Some(maze) = snapshot.maze else {
            out.push_str("(no maze)\n");
            return out;
        };
        let size = maze.size();
        let exit = maze.exit();

        for y in 0..size {
            let mut top = String::new();
            let mut mid = String::new();
            for x in 0..size {
                let pos = Position::new(x, y);
                let Some(cell) = maze.cell(pos) else {
                    continue;
                };
                top.push('+');
                top.push_str(if cell.top { "---" } else { "   " });
                mid.push(if cell.left { '|' } else { ' ' });
                mid.push(' ');
                mid.push(self.cell_glyph(snapshot, pos, exit));
                mid.push(' ');
            }
            top.push('+');
            let right_open = maze
                .cell(Position::new(size - 1, y))
                .is_some_and(|c| !c.right);
            mid.push(if right_open { ' ' } else { '|' });
            out.push_str(&top);
            out.push('\n');
            out.push_str(&mid);
            out.push('\n');
        }

        let mut bottom = String::new();
        for x in 0..size {
            let closed = maze
                .cell(Position::new(x, size - 1))
                .is_none_or(|c| c.bottom);
            bottom.push('+');
            bottom.push_str(if closed { "---" } else { "   " });
        }
        bottom.push('+');
        out.push_str(&bottom);
        out.push('\n');
        out
    }
}

/// One primitive for a canvas-like draw surface. Coordinates are in cells.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A wall segment from `from` to `to` (cell-corner coordinates).
    Wall {
        from: (f32, f32),
        to: (f32, f32),
        alpha: f32,
    },
    /// The exit marker at a cell.
    Exit { at: Position, alpha: f32 },
    /// A breadcrumb dot.
    Crumb { at: Position, alpha: f32 },
    /// The player dot.
    Player { at: Position },
}

/// Produces draw commands in paint order: walls, exit, trail, player.
#[derive(Debug, Default)]
pub struct DrawListRenderer;

impl DrawListRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DrawListRenderer {
    type Output = Vec<DrawCommand>;

    fn render(&self, snapshot: &Snapshot<'_>) -> Vec<DrawCommand> {
        let Some(maze) = snapshot.maze else {
            return Vec::new();
        };
        let mut commands = Vec::new();

        for (pos, cell) in maze.cells() {
            let v = snapshot.fog.as_ref().map_or(1.0, |f| f.value(pos));
            let alpha = WallStyle::wall_alpha(v);
            let (x, y) = (pos.x as f32, pos.y as f32);
            let sides = [
                (cell.top, (x, y), (x + 1.0, y)),
                (cell.right, (x + 1.0, y), (x + 1.0, y + 1.0)),
                (cell.bottom, (x, y + 1.0), (x + 1.0, y + 1.0)),
                (cell.left, (x, y), (x, y + 1.0)),
            ];
            for (present, from, to) in sides {
                if present {
                    commands.push(DrawCommand::Wall { from, to, alpha });
                }
            }
        }

        if let Some(alpha) = snapshot.exit_visibility {
            commands.push(DrawCommand::Exit {
                at: maze.exit(),
                alpha,
            });
        }

        let radius = snapshot.fog.as_ref().map_or(f32::INFINITY, |f| f.radius());
        let len = snapshot.trail.len();
        for (i, &at) in snapshot.trail.iter().enumerate() {
            if !is_within_sight(at, snapshot.player, radius) {
                continue;
            }
            let age = age_fraction(i, len);
            let alpha = WallStyle::trail_alpha(age, visibility(at, snapshot.player, radius));
            commands.push(DrawCommand::Crumb { at, alpha });
        }

        commands.push(DrawCommand::Player {
            at: snapshot.player,
        });
        commands
    }
}
