use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::io::Write;
use std::path::PathBuf;
use tilegrid_core::{self as game, Engine};

mod config;
mod render;
mod script;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// JSON file with optional `slide` and `swap` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force a seed instead of the configured one
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,

    /// Sleep for each settle delay as a renderer would
    #[arg(long)]
    realtime: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play slide-merge moves given as a string over L, R, U, D
    Slide { moves: String },
    /// Play swap-match swaps given as `r,c:r,c` pairs
    Swap {
        #[arg(required = true)]
        swaps: Vec<String>,
    },
}

struct Driver<W> {
    out: W,
    json: bool,
    realtime: bool,
}

impl<W: Write> Driver<W> {
    fn print<K>(&mut self, snapshot: &game::Snapshot<'_, K>) -> Result<()>
    where
        K: Copy + PartialEq + Display + Serialize,
    {
        if self.json {
            serde_json::to_writer(&mut self.out, snapshot)?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", render::render_text(snapshot))?;
        }
        Ok(())
    }

    /// Submits each action, ticks the engine until it settles, then prints the settled board.
    fn play<E>(
        &mut self,
        engine: &mut E,
        actions: impl IntoIterator<Item = E::Action>,
    ) -> Result<()>
    where
        E: Engine,
        E::Kind: Copy + PartialEq + Display + Serialize,
        E::Action: Copy + Debug,
        E::Step: Debug,
    {
        self.print(&engine.snapshot())?;
        for action in actions {
            let outcome = match engine.submit_action(action) {
                Ok(outcome) => outcome,
                Err(err) => {
                    log::warn!("Ignoring {:?}: {}", action, err);
                    continue;
                }
            };
            if !outcome.has_update() {
                log::info!("{:?} had no effect ({:?})", action, outcome);
                continue;
            }

            while !engine.is_settled() {
                let delay = engine.settle_delay();
                if self.realtime && !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                if let Some(step) = engine.tick().context("engine failed while settling")? {
                    log::trace!("step: {:?}", step);
                }
            }
            self.print(&engine.snapshot())?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("args: {:?}", args);

    let config = match &args.config {
        Some(path) => config::Config::load(path)?,
        None => config::Config::default(),
    }
    .finish(args.seed);

    let mut driver = Driver {
        out: std::io::stdout().lock(),
        json: args.json,
        realtime: args.realtime,
    };
    match &args.command {
        Command::Slide { moves } => {
            let moves = script::parse_moves(moves)?;
            let mut engine = game::SlideEngine::new(config.slide);
            driver.play(&mut engine, moves)?;
        }
        Command::Swap { swaps } => {
            let swaps = swaps
                .iter()
                .map(|token| script::parse_swap(token))
                .collect::<Result<Vec<_>>>()?;
            let mut engine = game::SwapEngine::new(config.swap);
            driver.play(&mut engine, swaps)?;
        }
    }
    Ok(())
}
