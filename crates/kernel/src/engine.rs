use mazerun_common::{Direction, Position, RoundId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::fog::{self, FogField};
use crate::maze::{Maze, MazeError};
use crate::trail::Trail;

/// How a round finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Reached the exit inside the time limit.
    Escaped,
    /// The clock ran out first.
    TimedOut,
}

/// Round lifecycle: `Idle -> Playing -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    #[default]
    Idle,
    Playing,
    Ended(Outcome),
}

/// An event record produced by every state-changing engine operation.
///
/// Frame ticks that change nothing are not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    /// A new round began on a maze generated from `seed`.
    Started {
        round: RoundId,
        seed: u64,
        size: usize,
        at_ms: u64,
    },
    /// The player took one step.
    Moved {
        from: Position,
        to: Position,
        direction: Direction,
    },
    /// The round reached a terminal state.
    Ended { outcome: Outcome, elapsed_ms: u64 },
    /// The round was stopped from outside.
    Stopped,
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player moved to the contained position.
    Moved(Position),
    /// A wall is in the way. Nothing changed.
    Blocked,
    /// No round is being played. Nothing changed.
    Ignored,
}

/// Errors from rebuilding an engine out of an event log.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Maze(#[from] MazeError),
}

/// Read-only view of the engine for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub round: Option<RoundId>,
    pub state: RoundState,
    pub maze: Option<&'a Maze>,
    pub player: Position,
    /// Breadcrumbs, oldest first.
    pub trail: Vec<Position>,
    pub elapsed_secs: f32,
    /// Exit marker opacity, `None` when the exit is out of sight.
    pub exit_visibility: Option<f32>,
    pub fog: Option<FogField>,
}

impl Snapshot<'_> {
    /// Elapsed seconds rounded down to tenths, as shown on the round timer.
    pub fn timer(&self) -> f32 {
        (self.elapsed_secs * 10.0).floor() / 10.0
    }
}

/// The maze round engine.
///
/// Owns the current maze, the player, the breadcrumb trail and the round
/// clock. Input events and frame ticks mutate it in place; renderers read a
/// [`Snapshot`].
///
/// Seeds are deterministic when the config pins one: each new round advances
/// the seed with splitmix64, so a fixed starting seed replays the same
/// sequence of mazes.
#[derive(Debug, Clone)]
pub struct MazeEngine {
    config: EngineConfig,
    state: RoundState,
    round: Option<RoundId>,
    maze: Option<Maze>,
    seed: u64,
    next_seed: Option<u64>,
    player: Position,
    trail: Trail,
    started_at_ms: u64,
    elapsed_ms: u64,
    /// Append-only log of state changes.
    event_log: Vec<RoundEvent>,
}

impl MazeEngine {
    /// Create an idle engine. Fails on an invalid config.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: RoundState::Idle,
            round: None,
            maze: None,
            seed: 0,
            next_seed: config.seed,
            player: Position::ORIGIN,
            trail: Trail::new(config.trail_capacity),
            started_at_ms: 0,
            elapsed_ms: 0,
            event_log: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == RoundState::Playing
    }

    pub fn round(&self) -> Option<RoundId> {
        self.round
    }

    /// Seed the current maze was generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn maze(&self) -> Option<&Maze> {
        self.maze.as_ref()
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Milliseconds since the round started, as of the last tick.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[RoundEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Begin a fresh round at `now_ms`, from any state.
    ///
    /// Generates a new maze, puts the player on the entry cell and clears
    /// the trail.
    pub fn start(&mut self, now_ms: u64) -> Result<RoundId, MazeError> {
        let seed = match self.next_seed {
            Some(seed) => {
                self.next_seed = Some(splitmix64(seed));
                seed
            }
            None => rand::rng().random(),
        };
        let maze = Maze::from_seed(self.config.size, seed)?;
        let round = RoundId::new();

        self.begin_round(round, seed, maze, now_ms);
        self.event_log.push(RoundEvent::Started {
            round,
            seed,
            size: self.config.size,
            at_ms: now_ms,
        });
        tracing::debug!(round = %round.short(), seed, size = self.config.size, "round started");
        Ok(round)
    }

    fn begin_round(&mut self, round: RoundId, seed: u64, maze: Maze, now_ms: u64) {
        self.round = Some(round);
        self.seed = seed;
        self.maze = Some(maze);
        self.player = Position::ORIGIN;
        self.trail.clear();
        self.started_at_ms = now_ms;
        self.elapsed_ms = 0;
        self.state = RoundState::Playing;
    }

    /// Halt the round. Later ticks and moves are ignored until the next start.
    pub fn stop(&mut self) {
        if self.state == RoundState::Idle {
            return;
        }
        self.state = RoundState::Idle;
        self.event_log.push(RoundEvent::Stopped);
        tracing::debug!("round stopped");
    }

    /// Try to step the player one cell in `direction`.
    ///
    /// An accepted move records the old position on the trail. Landing on the
    /// exit ends the round.
    pub fn move_player(&mut self, direction: Direction) -> MoveOutcome {
        if self.state != RoundState::Playing {
            return MoveOutcome::Ignored;
        }
        let Some(maze) = &self.maze else {
            return MoveOutcome::Ignored;
        };
        let target = maze
            .can_move(self.player, direction)
            .then(|| self.player.step(direction, maze.size()))
            .flatten();
        let Some(to) = target else {
            tracing::trace!(at = %self.player, %direction, "move blocked");
            return MoveOutcome::Blocked;
        };
        let exit = maze.exit();

        let from = self.player;
        self.trail.push(from);
        self.player = to;
        self.event_log.push(RoundEvent::Moved {
            from,
            to,
            direction,
        });
        tracing::trace!(%from, %to, "moved");

        if to == exit {
            let outcome = if self.elapsed_ms < self.config.time_limit_ms {
                Outcome::Escaped
            } else {
                Outcome::TimedOut
            };
            self.finish(outcome);
        }
        MoveOutcome::Moved(to)
    }

    /// Advance the round clock to `now_ms`.
    ///
    /// Returns the outcome if the round ended on this tick.
    pub fn tick(&mut self, now_ms: u64) -> Option<Outcome> {
        if self.state != RoundState::Playing {
            return None;
        }
        self.elapsed_ms = now_ms.saturating_sub(self.started_at_ms);

        if self.elapsed_ms >= self.config.time_limit_ms {
            self.finish(Outcome::TimedOut);
            return Some(Outcome::TimedOut);
        }
        // Only reachable on a 1x1 maze, where the entry is the exit.
        let exit = self.maze.as_ref().map(Maze::exit);
        if exit == Some(self.player) {
            self.finish(Outcome::Escaped);
            return Some(Outcome::Escaped);
        }
        None
    }

    fn finish(&mut self, outcome: Outcome) {
        self.state = RoundState::Ended(outcome);
        self.event_log.push(RoundEvent::Ended {
            outcome,
            elapsed_ms: self.elapsed_ms,
        });
        tracing::info!(
            round = %self.round.map(|r| r.short()).unwrap_or_default(),
            ?outcome,
            elapsed_ms = self.elapsed_ms,
            "round ended"
        );
    }

    /// Build the frame view: fog field, exit marker visibility, trail.
    pub fn snapshot(&self) -> Snapshot<'_> {
        let radius = self.config.fog_radius;
        let fog = self
            .maze
            .as_ref()
            .map(|m| FogField::compute(m.size(), self.player, radius));
        let exit_visibility = self.maze.as_ref().and_then(|m| {
            let exit = m.exit();
            fog::is_within_sight(exit, self.player, radius)
                .then(|| fog::visibility(exit, self.player, radius))
        });

        Snapshot {
            round: self.round,
            state: self.state,
            maze: self.maze.as_ref(),
            player: self.player,
            trail: self.trail.iter().collect(),
            elapsed_secs: self.elapsed_ms as f32 / 1000.0,
            exit_visibility,
            fog,
        }
    }

    /// Rebuild an engine from an event log.
    ///
    /// Mazes are regenerated from the seeds carried by `Started` events.
    pub fn replay(config: EngineConfig, events: &[RoundEvent]) -> Result<Self, EngineError> {
        let pinned = config.seed.is_some();
        let mut engine = Self::new(config)?;
        for event in events {
            match event {
                RoundEvent::Started {
                    round,
                    seed,
                    size,
                    at_ms,
                } => {
                    let maze = Maze::from_seed(*size, *seed)?;
                    engine.begin_round(*round, *seed, maze, *at_ms);
                    if pinned {
                        engine.next_seed = Some(splitmix64(*seed));
                    }
                }
                RoundEvent::Moved { from, to, .. } => {
                    engine.trail.push(*from);
                    engine.player = *to;
                }
                RoundEvent::Ended {
                    outcome,
                    elapsed_ms,
                } => {
                    engine.elapsed_ms = *elapsed_ms;
                    engine.state = RoundState::Ended(*outcome);
                }
                RoundEvent::Stopped => {
                    engine.state = RoundState::Idle;
                }
            }
        }
        Ok(engine)
    }

    /// Deterministic hash of the round: seed, walls, player, trail and state.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.seed.to_le_bytes());
        if let Some(maze) = &self.maze {
            mix(&mut h, &maze.layout_hash().to_le_bytes());
        }
        mix(&mut h, &(self.player.x as u64).to_le_bytes());
        mix(&mut h, &(self.player.y as u64).to_le_bytes());
        for p in self.trail.iter() {
            mix(&mut h, &(p.x as u64).to_le_bytes());
            mix(&mut h, &(p.y as u64).to_le_bytes());
        }
        let state_code: u8 = match self.state {
            RoundState::Idle => 0,
            RoundState::Playing => 1,
            RoundState::Ended(Outcome::Escaped) => 2,
            RoundState::Ended(Outcome::TimedOut) => 3,
        };
        mix(&mut h, &[state_code]);
        h
    }
}

/// Splitmix64 step. Advances a pinned seed between rounds.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
