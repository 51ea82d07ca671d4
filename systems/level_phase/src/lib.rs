#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level phase controller driving a level from its first spawn to resolution.
//!
//! The controller is the single writer of level phase: it observes time,
//! deaths and live counts, and answers with `EnterPhase`, `CommitRewards`,
//! `ResolveLevel` and boss spawn commands. Exactly one terminal path is taken
//! per level. When the player dies in the same batch of events as the level
//! clock expires or the boss dies, the game-over path wins.

use std::time::Duration;

use glam::Vec2;
use starfall_core::{
    BossPatrol, Command, EntityKind, Event, ExitTarget, LevelId, LevelOutcome, LevelPhase,
    LiveCounts, Playfield, TransitionChoice,
};
use tracing::{debug, info};

/// Configuration parameters required to construct the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Level being controlled.
    pub level: LevelId,
    /// Length of the active phase.
    pub level_duration: Duration,
    /// Interval between clear checks while awaiting clear.
    pub clear_poll_interval: Duration,
    /// Threats further than this above the visible top are removed when spawning halts.
    pub offscreen_margin: f32,
    /// Delay before the transition choice is offered.
    pub choice_reveal_delay: Duration,
    /// Delay between accepting the boss fight and the boss appearing.
    pub boss_spawn_delay: Duration,
    /// Length of the boss intro cue, if one plays.
    pub boss_intro_cue: Duration,
    /// Delay between the boss's death and resolution.
    pub victory_delay: Duration,
    /// Where the boss enters.
    pub boss_spawn: Vec2,
    /// Route the boss patrols.
    pub boss_patrol: BossPatrol,
    /// Hit points of the boss.
    pub boss_health: u32,
}

impl Config {
    /// Default tuning for the provided level.
    #[must_use]
    pub fn for_level(level: LevelId) -> Self {
        let level_duration = match level {
            LevelId::AsteroidField => Duration::from_secs(60),
            LevelId::AlienFront => Duration::from_secs(90),
        };
        Self {
            level,
            level_duration,
            clear_poll_interval: Duration::from_millis(500),
            offscreen_margin: 0.5,
            choice_reveal_delay: Duration::from_secs(1),
            boss_spawn_delay: Duration::from_secs(2),
            boss_intro_cue: Duration::ZERO,
            victory_delay: Duration::from_secs(3),
            boss_spawn: Vec2::new(0.0, 6.0),
            boss_patrol: BossPatrol::default(),
            boss_health: 100,
        }
    }

    fn boss_intro_length(&self) -> Duration {
        self.boss_spawn_delay.max(self.boss_intro_cue)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Active { elapsed: Duration },
    AwaitingClear { since_poll: Duration },
    Transition { elapsed: Duration, revealed: bool },
    BossIntro { elapsed: Duration },
    BossFight,
    Victory { elapsed: Duration },
    Resolved,
}

/// Level phase controller for a single level run.
#[derive(Debug)]
pub struct LevelPhaseController {
    config: Config,
    stage: Stage,
    terminal: Option<LevelOutcome>,
}

impl LevelPhaseController {
    /// Creates a controller at the start of the active phase.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stage: Stage::Active {
                elapsed: Duration::ZERO,
            },
            terminal: None,
        }
    }

    /// Terminal outcome latched so far.
    #[must_use]
    pub const fn outcome(&self) -> Option<LevelOutcome> {
        self.terminal
    }

    /// Reports whether the transition choice is on offer.
    #[must_use]
    pub const fn awaiting_choice(&self) -> bool {
        matches!(self.stage, Stage::Transition { revealed: true, .. })
    }

    /// Reports whether the level has resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.stage, Stage::Resolved)
    }

    /// Time left on the level clock.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        match self.stage {
            Stage::Active { elapsed } => self.config.level_duration.saturating_sub(elapsed),
            _ => Duration::ZERO,
        }
    }

    /// Consumes events, live counts and the player's choice to emit phase commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        live: LiveCounts,
        playfield: &Playfield,
        choice: Option<TransitionChoice>,
        out: &mut Vec<Command>,
    ) {
        let mut dt = Duration::ZERO;
        let mut player_died = false;
        let mut boss_died = false;
        for event in events {
            match event {
                Event::LevelConfigured { .. } => {
                    self.stage = Stage::Active {
                        elapsed: Duration::ZERO,
                    };
                    self.terminal = None;
                }
                Event::TimeAdvanced { dt: step } => dt = dt.saturating_add(*step),
                Event::Died { kind, .. } => match kind {
                    EntityKind::Player => player_died = true,
                    EntityKind::Boss => boss_died = true,
                    _ => {}
                },
                Event::LevelResolved { .. } => self.stage = Stage::Resolved,
                _ => {}
            }
        }

        if self.stage == Stage::Resolved {
            return;
        }

        if player_died && self.terminal.is_none() {
            info!("player lost; game over");
            self.terminal = Some(LevelOutcome::GameOver);
            self.stage = Stage::Resolved;
            out.push(Command::FreezeWorld);
            out.push(Command::CommitRewards);
            out.push(Command::ResolveLevel {
                outcome: LevelOutcome::GameOver,
                exit: ExitTarget::MainMenu,
            });
            return;
        }

        if boss_died && self.stage == Stage::BossFight && self.terminal.is_none() {
            info!("boss defeated");
            self.terminal = Some(LevelOutcome::BossDefeated);
            self.stage = Stage::Victory {
                elapsed: Duration::ZERO,
            };
            out.push(Command::CommitRewards);
            return;
        }

        self.advance(dt, live, playfield, choice, out);
    }

    fn advance(
        &mut self,
        dt: Duration,
        live: LiveCounts,
        playfield: &Playfield,
        choice: Option<TransitionChoice>,
        out: &mut Vec<Command>,
    ) {
        match self.stage {
            Stage::Active { elapsed } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed < self.config.level_duration {
                    self.stage = Stage::Active { elapsed };
                    return;
                }
                if self.config.level.has_boss() {
                    info!("level clock expired; waiting for hostiles to clear");
                    self.stage = Stage::AwaitingClear {
                        since_poll: self.config.clear_poll_interval,
                    };
                    out.push(Command::EnterPhase {
                        phase: LevelPhase::AwaitingClear,
                    });
                    out.push(Command::RemoveThreatsAbove {
                        y: playfield.top() + self.config.offscreen_margin,
                    });
                } else {
                    info!("level clock expired; level complete");
                    self.finish(LevelOutcome::Completed, ExitTarget::Summary, out);
                }
            }
            Stage::AwaitingClear { since_poll } => {
                let since_poll = since_poll.saturating_add(dt);
                if since_poll < self.config.clear_poll_interval {
                    self.stage = Stage::AwaitingClear { since_poll };
                    return;
                }
                if !live.hostiles_cleared() {
                    debug!(
                        attackers = live.attackers,
                        shots = live.hostile_projectiles,
                        "hostiles remain"
                    );
                    self.stage = Stage::AwaitingClear {
                        since_poll: Duration::ZERO,
                    };
                    return;
                }
                info!("hostiles cleared");
                self.stage = Stage::Transition {
                    elapsed: Duration::ZERO,
                    revealed: false,
                };
                out.push(Command::CommitRewards);
                out.push(Command::EnterPhase {
                    phase: LevelPhase::Transition,
                });
            }
            Stage::Transition { elapsed, revealed } => {
                let elapsed = elapsed.saturating_add(dt);
                let revealed = revealed || elapsed >= self.config.choice_reveal_delay;
                if revealed && !matches!(self.stage, Stage::Transition { revealed: true, .. }) {
                    info!("transition choice offered");
                }
                self.stage = Stage::Transition { elapsed, revealed };
                if !revealed {
                    return;
                }

                match choice {
                    Some(TransitionChoice::ContinueToBoss) => {
                        info!("boss encounter accepted");
                        self.stage = Stage::BossIntro {
                            elapsed: Duration::ZERO,
                        };
                        out.push(Command::EnterPhase {
                            phase: LevelPhase::BossIntro,
                        });
                    }
                    Some(TransitionChoice::Return) => {
                        info!("boss encounter declined");
                        self.finish(LevelOutcome::Retreated, ExitTarget::Summary, out);
                    }
                    None => {}
                }
            }
            Stage::BossIntro { elapsed } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed < self.config.boss_intro_length() {
                    self.stage = Stage::BossIntro { elapsed };
                    return;
                }
                info!("boss arrives");
                self.stage = Stage::BossFight;
                out.push(Command::EnterPhase {
                    phase: LevelPhase::BossFight,
                });
                out.push(Command::SpawnBoss {
                    position: self.config.boss_spawn,
                    patrol: self.config.boss_patrol,
                    max_health: self.config.boss_health,
                });
            }
            Stage::BossFight => {}
            Stage::Victory { elapsed } => {
                let elapsed = elapsed.saturating_add(dt);
                if elapsed < self.config.victory_delay {
                    self.stage = Stage::Victory { elapsed };
                    return;
                }
                self.stage = Stage::Resolved;
                out.push(Command::ResolveLevel {
                    outcome: LevelOutcome::BossDefeated,
                    exit: ExitTarget::MainMenu,
                });
            }
            Stage::Resolved => {}
        }
    }

    fn finish(&mut self, outcome: LevelOutcome, exit: ExitTarget, out: &mut Vec<Command>) {
        self.terminal = Some(outcome);
        self.stage = Stage::Resolved;
        out.push(Command::CommitRewards);
        out.push(Command::ResolveLevel { outcome, exit });
    }
}
