#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Starfall level.

mod audio;
mod config;
mod pilot;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use starfall_core::{LevelId, TransitionChoice};
use starfall_system_progression::{JsonFileStore, Progression, Unlock};
use starfall_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    audio::{AudioCue, AudioSink, LogSink},
    config::GameConfig,
    pilot::Autopilot,
    session::{Launch, Session},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    AsteroidField,
    AlienFront,
}

impl From<LevelArg> for LevelId {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::AsteroidField => Self::AsteroidField,
            LevelArg::AlienFront => Self::AlienFront,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ChoiceArg {
    /// Stay for the boss fight.
    Boss,
    /// Head home with what was collected.
    Return,
}

impl From<ChoiceArg> for TransitionChoice {
    fn from(value: ChoiceArg) -> Self {
        match value {
            ChoiceArg::Boss => Self::ContinueToBoss,
            ChoiceArg::Return => Self::Return,
        }
    }
}

/// Runs one Starfall level with a scripted pilot and records progress.
#[derive(Debug, Parser)]
#[command(name = "starfall", version, about)]
struct Cli {
    /// Level to fly.
    #[arg(long, value_enum, default_value_t = LevelArg::AsteroidField)]
    level: LevelArg,
    /// TOML file overriding the game tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Progress file; defaults to the user's data directory.
    #[arg(long)]
    progress: Option<PathBuf>,
    /// Seed for spawning and drops.
    #[arg(long)]
    seed: Option<u64>,
    /// Answer given when the boss encounter is offered.
    #[arg(long, value_enum, default_value_t = ChoiceArg::Boss)]
    choice: ChoiceArg,
    /// Stop after this much simulated time even if the level is unresolved.
    #[arg(long)]
    max_seconds: Option<u32>,
    /// Simulation ticks per second.
    #[arg(long)]
    tick_hz: Option<u32>,
    /// Delete saved progress before flying.
    #[arg(long)]
    reset_progress: bool,
    /// Grant every unlock before flying.
    #[arg(long)]
    unlock_all: bool,
}

/// Entry point for the Starfall command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = GameConfig::load(cli.config.as_deref()).context("failed to load game configuration")?;
    if let Some(seed) = cli.seed {
        config.session.seed = seed;
    }
    if let Some(tick_hz) = cli.tick_hz {
        config.session.tick_hz = tick_hz;
    }
    if let Some(max_seconds) = cli.max_seconds {
        config.session.max_seconds = max_seconds;
    }
    config.validate().context("invalid command line override")?;

    let progress_path = match cli.progress {
        Some(path) => path,
        None => JsonFileStore::default_path().context("failed to locate the progress file")?,
    };
    let store = JsonFileStore::open(&progress_path)
        .with_context(|| format!("failed to open progress at {}", progress_path.display()))?;
    let mut progression = Progression::new(config.progression(), store);
    if cli.reset_progress {
        progression.reset().context("failed to reset progress")?;
    }
    if cli.unlock_all {
        progression.unlock_all().context("failed to grant unlocks")?;
    }

    let level = LevelId::from(cli.level);
    let before = progression.snapshot();
    if !before.level_available(level) {
        bail!("level {} is locked; complete level 1 first", level.number());
    }

    let mut session = Session::start(
        &config,
        Launch {
            level,
            seed: config.session.seed,
            loadout: progression.loadout(),
            missiles_unlocked: before.missiles_unlocked,
        },
    );
    println!("{}", query::welcome_banner(session.world()));

    let pilot = Autopilot::new(cli.choice.into());
    let mut sink = LogSink::default();
    let mut unlocks = Vec::new();
    let limit = Duration::from_secs(u64::from(config.session.max_seconds));
    let mut choice_announced = false;

    while !session.is_over() && query::elapsed(session.world()) < limit {
        let world = session.world();
        let input = pilot.decide(
            &query::entity_view(world),
            query::playfield(world),
            session.armament(),
        );
        let report = session.step(input);

        for cue in report.notices.iter().map(|notice| AudioCue::from_notice(*notice)) {
            sink.play(cue);
        }
        for cue in report.events.iter().filter_map(AudioCue::from_event) {
            sink.play(cue);
        }
        if session.awaiting_choice() && !choice_announced {
            choice_announced = true;
            info!(choice = ?cli.choice, "boss encounter offered");
        }
        progression
            .handle(&report.events, &mut unlocks)
            .context("failed to save progress")?;
    }

    let world = session.world();
    let rewards = query::session_rewards(world);
    let after = progression.snapshot();
    match query::resolution(world) {
        Some((outcome, exit)) => println!("outcome: {outcome:?} -> {exit:?}"),
        None => {
            warn!(limit = ?limit, "run stopped before the level resolved");
            println!("outcome: unresolved after {}s", config.session.max_seconds);
        }
    }
    println!(
        "collected: {} shards, {} goo (elapsed {:.1}s, {} audio cues)",
        rewards.shards,
        rewards.goo,
        query::elapsed(world).as_secs_f32(),
        sink.played()
    );
    println!(
        "totals: {} shards, {} goo; missiles {}, shield {}, level 2 {}",
        after.total_shards,
        after.total_goo,
        flag(after.missiles_unlocked),
        flag(after.shield_unlocked),
        flag(after.level2_unlocked)
    );
    for unlock in unlocks {
        let name = match unlock {
            Unlock::Missiles => "missiles",
            Unlock::Shield => "shield",
            Unlock::AlienFront => "level 2",
        };
        println!("unlocked: {name}");
    }
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value {
        "unlocked"
    } else {
        "locked"
    }
}
