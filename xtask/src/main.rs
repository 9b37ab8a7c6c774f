use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for mazerun")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and doc in order
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the maze generation benchmarks
    Bench,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for task in [Task::Fmt, Task::Clippy, Task::Test, Task::Doc] {
                task.run()?;
            }
        }
        Commands::Fmt => Task::Fmt.run()?,
        Commands::Clippy => Task::Clippy.run()?,
        Commands::Test => Task::Test.run()?,
        Commands::Doc => Task::Doc.run()?,
        Commands::Bench => Task::Bench.run()?,
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Fmt,
    Clippy,
    Test,
    Doc,
    Bench,
}

impl Task {
    fn args(self) -> &'static [&'static str] {
        match self {
            Task::Fmt => &["fmt", "--all", "--", "--check"],
            Task::Clippy => &[
                "clippy",
                "--workspace",
                "--all-targets",
                "--",
                "-D",
                "warnings",
            ],
            Task::Test => &["test", "--workspace"],
            Task::Doc => &["doc", "--workspace", "--no-deps"],
            Task::Bench => &["bench", "-p", "mazerun-kernel"],
        }
    }

    fn run(self) -> Result<()> {
        let args = self.args();
        println!("==> Running cargo {}", args.join(" "));
        let status = Command::new("cargo").args(args).status()?;
        if !status.success() {
            anyhow::bail!("cargo {} failed", args[0]);
        }
        Ok(())
    }
}
