use mazerun_common::Direction;
use mazerun_kernel::{MazeEngine, MazeError, MoveOutcome};

/// A high-level action produced from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Step the player one cell.
    Move(Direction),
    /// Start a new round (also restarts a finished one).
    Start,
    /// Stop the current round.
    Stop,
}

impl Action {
    /// Map a key name (DOM `KeyboardEvent.key` style) to an action.
    pub fn from_key(key: &str) -> Option<Self> {
        let action = match key {
            "ArrowUp" | "w" | "W" => Action::Move(Direction::Up),
            "ArrowDown" | "s" | "S" => Action::Move(Direction::Down),
            "ArrowLeft" | "a" | "A" => Action::Move(Direction::Left),
            "ArrowRight" | "d" | "D" => Action::Move(Direction::Right),
            "Enter" | " " => Action::Start,
            "Escape" => Action::Stop,
            _ => return None,
        };
        Some(action)
    }
}

/// Feeds actions into a [`MazeEngine`].
#[derive(Debug, Default)]
pub struct InputMapper;

impl InputMapper {
    pub fn new() -> Self {
        Self
    }

    /// Apply one action. Returns the move result for `Move`, `None` otherwise.
    pub fn apply(
        &self,
        engine: &mut MazeEngine,
        action: Action,
        now_ms: u64,
    ) -> Result<Option<MoveOutcome>, MazeError> {
        match action {
            Action::Move(direction) => Ok(Some(engine.move_player(direction))),
            Action::Start => {
                engine.start(now_ms)?;
                Ok(None)
            }
            Action::Stop => {
                engine.stop();
                Ok(None)
            }
        }
    }

    /// Map `key` and apply it. Unbound keys do nothing.
    pub fn handle_key(
        &self,
        engine: &mut MazeEngine,
        key: &str,
        now_ms: u64,
    ) -> Result<Option<MoveOutcome>, MazeError> {
        let Some(action) = Action::from_key(key) else {
            tracing::trace!(key, "unbound key");
            return Ok(None);
        };
        self.apply(engine, action, now_ms)
    }
}
