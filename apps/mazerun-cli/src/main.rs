use anyhow::Context;
use clap::{Parser, Subcommand};
use mazerun_input::{Action, InputMapper};
use mazerun_kernel::{EngineConfig, Maze, MazeEngine, MoveOutcome, RoundState};
use mazerun_render::{DebugTextRenderer, Renderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mazerun-cli", about = "CLI harness for the mazerun engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default round settings
    Info,
    /// Generate a maze and print it with its stats
    Generate {
        /// Side length of the maze
        #[arg(short = 'n', long, default_value = "15")]
        size: usize,
        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Print the path from entry to exit
    Solve {
        #[arg(short = 'n', long, default_value = "15")]
        size: usize,
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Play a round along the solution path, one move per tick
    Simulate {
        /// RNG seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON engine config
        #[arg(short, long)]
        config: Option<String>,
        /// Milliseconds between moves
        #[arg(long, default_value = "250")]
        step_ms: u64,
        /// Print the final snapshot as JSON instead of a text frame
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let defaults = EngineConfig::default();
            println!("mazerun-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "defaults: size={} fog_radius={} time_limit={}ms trail={}",
                defaults.size, defaults.fog_radius, defaults.time_limit_ms, defaults.trail_capacity
            );
        }
        Commands::Generate { size, seed } => {
            let mut engine = MazeEngine::new(EngineConfig {
                size,
                seed: Some(seed),
                ..Default::default()
            })?;
            engine.start(0)?;
            let frame = DebugTextRenderer::unfogged().render(&engine.snapshot());
            print!("{frame}");
            let maze = engine.maze().context("no maze after start")?;
            println!(
                "size={} seed={} passages={} dead_ends={} hash={:#x}",
                maze.size(),
                seed,
                maze.open_passages(),
                maze.dead_ends(),
                maze.layout_hash()
            );
        }
        Commands::Solve { size, seed } => {
            let maze = Maze::from_seed(size, seed)?;
            let path = maze
                .solve(maze.entry(), maze.exit())
                .context("exit unreachable")?;
            let moves: String = path.iter().map(|d| d.glyph()).collect();
            println!("Path length: {}", path.len());
            println!("Moves: {moves}");
        }
        Commands::Simulate {
            seed,
            config,
            step_ms,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => {
                    let context = format!("loading config {path}");
                    EngineConfig::load(&path).context(context)?
                }
                None => EngineConfig::default(),
            };
            if seed.is_some() {
                cfg.seed = seed;
            }
            tracing::debug!(?cfg, step_ms, "simulation config");
            let mut engine = MazeEngine::new(cfg)?;
            simulate(&mut engine, step_ms)?;

            let snapshot = engine.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", DebugTextRenderer::new().render(&snapshot));
            }
            match engine.state() {
                RoundState::Ended(outcome) => {
                    println!("Outcome: {outcome:?} in {:.1}s", snapshot.timer())
                }
                other => println!("Round did not finish: {other:?}"),
            }
            println!("Events: {}", engine.events().len());
            let replayed = MazeEngine::replay(engine.config().clone(), engine.events())?;
            let verdict = if replayed.state_hash() == engine.state_hash() {
                "OK"
            } else {
                "MISMATCH"
            };
            println!("Replay: {verdict}");
        }
    }

    Ok(())
}

/// Start a round and walk the solution path, one move per `step_ms` tick,
/// then keep ticking until the round ends. The clock saturates instead of
/// wrapping.
fn simulate(engine: &mut MazeEngine, step_ms: u64) -> anyhow::Result<()> {
    let mapper = InputMapper::new();
    let mut now: u64 = 0;
    mapper.apply(engine, Action::Start, now)?;
    let path = engine
        .maze()
        .and_then(|m| m.solve(m.entry(), m.exit()))
        .context("no maze after start")?;
    let (seed, moves) = (engine.seed(), path.len());
    println!("Simulating round: seed={seed}, moves={moves}");

    for direction in path {
        now = now.saturating_add(step_ms);
        if engine.tick(now).is_some() {
            break;
        }
        let outcome = mapper.apply(engine, Action::Move(direction), now)?;
        if let Some(MoveOutcome::Blocked) = outcome {
            anyhow::bail!("solution path blocked moving {direction}");
        }
        if !engine.is_playing() {
            break;
        }
    }
    // Keep the clock running if the round is still going.
    while engine.is_playing() {
        now = now.saturating_add(step_ms);
        engine.tick(now);
    }
    Ok(())
}
