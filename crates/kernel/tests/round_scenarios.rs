use mazerun_common::{Direction, Position};
use mazerun_kernel::{
    EngineConfig, FOG_FLOOR, Maze, MazeEngine, MoveOutcome, Outcome, RoundEvent, RoundState,
    visibility,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

fn engine_with(config: EngineConfig) -> MazeEngine {
    MazeEngine::new(config).unwrap()
}

fn ended_events(engine: &MazeEngine) -> usize {
    engine
        .events()
        .iter()
        .filter(|e| matches!(e, RoundEvent::Ended { .. }))
        .count()
}

#[test]
fn escape_along_solution_path() {
    let mut engine = engine_with(EngineConfig::with_seed(2024));
    engine.start(0).unwrap();
    let maze = engine.maze().unwrap().clone();
    let path = maze.solve(maze.entry(), maze.exit()).unwrap();

    let mut now = 0;
    for (i, d) in path.iter().enumerate() {
        now += 100;
        assert_eq!(engine.tick(now), None, "step {i}");
        assert!(matches!(engine.move_player(*d), MoveOutcome::Moved(_)));
    }

    assert_eq!(engine.player(), Position::new(14, 14));
    assert_eq!(engine.state(), RoundState::Ended(Outcome::Escaped));
    assert!(engine.elapsed_ms() < 30_000);
    assert_eq!(ended_events(&engine), 1);

    // Round over: further input is ignored.
    assert_eq!(engine.move_player(Direction::Left), MoveOutcome::Ignored);
}

#[test]
fn reaching_exit_after_time_limit_is_a_loss() {
    let config = EngineConfig {
        size: 4,
        time_limit_ms: 1_000,
        seed: Some(3),
        ..Default::default()
    };
    let mut engine = engine_with(config);
    engine.start(0).unwrap();
    let maze = engine.maze().unwrap().clone();
    let path = maze.solve(maze.entry(), maze.exit()).unwrap();
    let (last, rest) = path.split_last().unwrap();
    for d in rest {
        engine.move_player(*d);
    }
    // The tick at the limit ends the round before the last move lands.
    assert_eq!(engine.tick(1_000), Some(Outcome::TimedOut));
    assert_eq!(engine.move_player(*last), MoveOutcome::Ignored);
    assert_eq!(engine.state(), RoundState::Ended(Outcome::TimedOut));
}

#[test]
fn idle_player_times_out_once_and_stop_freezes_state() {
    let mut engine = engine_with(EngineConfig::with_seed(7));
    engine.start(500).unwrap();

    let mut transitions = 0;
    for now in (500..=40_000).step_by(16) {
        if engine.tick(now).is_some() {
            transitions += 1;
        }
    }
    assert_eq!(transitions, 1);
    assert_eq!(engine.state(), RoundState::Ended(Outcome::TimedOut));
    assert_eq!(ended_events(&engine), 1);

    engine.stop();
    let frozen = engine.state_hash();
    let elapsed = engine.elapsed_ms();
    let events = engine.events().len();
    for now in [41_000, 50_000, 90_000] {
        assert_eq!(engine.tick(now), None);
        assert_eq!(engine.move_player(Direction::Right), MoveOutcome::Ignored);
    }
    assert_eq!(engine.state_hash(), frozen);
    assert_eq!(engine.elapsed_ms(), elapsed);
    assert_eq!(engine.events().len(), events);
}

#[test]
fn blocked_move_keeps_position_and_trail() {
    let mut engine = engine_with(EngineConfig::with_seed(11));
    engine.start(0).unwrap();
    let maze = engine.maze().unwrap().clone();

    // Origin always has its top and left walls.
    for d in [Direction::Up, Direction::Left] {
        assert_eq!(engine.move_player(d), MoveOutcome::Blocked);
    }
    assert_eq!(engine.player(), Position::ORIGIN);
    assert!(engine.trail().is_empty());

    let (d, next) = maze.neighbors(Position::ORIGIN).next().unwrap();
    engine.move_player(d);
    let blocked = Direction::ALL
        .into_iter()
        .find(|d| !maze.can_move(next, *d))
        .unwrap();
    assert_eq!(engine.move_player(blocked), MoveOutcome::Blocked);
    assert_eq!(engine.player(), next);
    assert_eq!(engine.trail().len(), 1);
}

#[test]
fn random_walk_stays_in_bounds_and_trail_is_bounded() {
    let config = EngineConfig {
        size: 9,
        trail_capacity: 12,
        time_limit_ms: u64::MAX,
        seed: Some(5),
        ..Default::default()
    };
    let mut engine = engine_with(config);
    engine.start(0).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let mut accepted = Vec::new();

    for _ in 0..2_000 {
        if !engine.is_playing() {
            break;
        }
        let before = engine.player();
        let d = *Direction::ALL.choose(&mut rng).unwrap();
        match engine.move_player(d) {
            MoveOutcome::Moved(to) => {
                assert!(to.x < 9 && to.y < 9);
                assert_eq!(before.distance(to), 1.0);
                accepted.push(before);
            }
            MoveOutcome::Blocked => assert_eq!(engine.player(), before),
            MoveOutcome::Ignored => unreachable!("round still playing"),
        }
        assert!(engine.trail().len() <= 12);
    }

    let expected: Vec<Position> = accepted.iter().rev().take(12).rev().copied().collect();
    assert_eq!(engine.trail().iter().collect::<Vec<_>>(), expected);
}

#[test]
fn every_seed_yields_perfect_maze() {
    for seed in 0..50 {
        let maze = Maze::from_seed(15, seed).unwrap();
        assert_eq!(maze.open_passages(), 15 * 15 - 1);
        let path = maze.solve(maze.entry(), maze.exit());
        assert!(path.is_some(), "seed {seed}");
        for (pos, _) in maze.cells() {
            assert!(maze.solve(maze.entry(), pos).is_some());
        }
    }
}

#[test]
fn visibility_in_snapshot_follows_player() {
    let mut engine = engine_with(EngineConfig::with_seed(21));
    engine.start(0).unwrap();
    let snap = engine.snapshot();
    let fog = snap.fog.as_ref().unwrap();
    for cell in fog.visible_cells() {
        assert_eq!(cell.visibility, visibility(cell.pos, snap.player, 4.0));
        assert!(cell.visibility >= FOG_FLOOR);
    }
    assert_eq!(fog.value(Position::new(14, 0)), FOG_FLOOR);
}

#[test]
fn replay_of_full_round_matches() {
    let mut engine = engine_with(EngineConfig::with_seed(77));
    engine.start(0).unwrap();
    let maze = engine.maze().unwrap().clone();
    for d in maze.solve(maze.entry(), maze.exit()).unwrap() {
        engine.move_player(d);
    }
    let events = engine.events().to_vec();
    let config = EngineConfig::with_seed(77);
    let replayed = MazeEngine::replay(config, &events).unwrap();
    assert_eq!(replayed.state(), RoundState::Ended(Outcome::Escaped));
    assert_eq!(replayed.state_hash(), engine.state_hash());
}
