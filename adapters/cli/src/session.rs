//! Tick loop wiring the world to every gameplay system.

use std::time::Duration;

use starfall_core::{Command, Event, LevelId, Loadout, Playfield};
use starfall_system_attacks::Attacks;
use starfall_system_collision::Collision;
use starfall_system_level_phase::LevelPhaseController;
use starfall_system_spawning::Spawning;
use starfall_system_weapon::{FireControl, TriggerInput, WeaponNotice};
use starfall_world::{self as world, query, World};
use tracing::warn;

use crate::{config::GameConfig, pilot::Armament, pilot::PilotInput};

/// Parameters that differ between runs of the same configuration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) level: LevelId,
    pub(crate) seed: u64,
    pub(crate) loadout: Loadout,
    pub(crate) missiles_unlocked: bool,
}

/// Everything that happened during one tick.
#[derive(Debug, Default)]
pub(crate) struct StepReport {
    pub(crate) events: Vec<Event>,
    pub(crate) notices: Vec<WeaponNotice>,
}

/// One level run: the authoritative world plus the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    spawning: Spawning,
    attacks: Attacks,
    collision: Collision,
    fire_control: FireControl,
    phase: LevelPhaseController,
    missiles_unlocked: bool,
    tick: Duration,
    pump_limit: usize,
}

impl Session {
    /// Configures the world for `launch` and lets every system observe the setup.
    pub(crate) fn start(config: &GameConfig, launch: Launch) -> Self {
        let mut session = Self {
            world: World::new(),
            spawning: Spawning::new(config.spawning(launch.level, launch.seed)),
            attacks: Attacks::new(config.attacks()),
            collision: Collision::new(config.collision()),
            fire_control: FireControl::new(config.weapon(), launch.missiles_unlocked),
            phase: LevelPhaseController::new(config.level_phase(launch.level)),
            missiles_unlocked: launch.missiles_unlocked,
            tick: config.tick(),
            pump_limit: config.session.pump_limit,
        };

        let mut events = Vec::new();
        world::apply(
            &mut session.world,
            Command::ConfigureLevel {
                level: launch.level,
                playfield: Playfield::default(),
                loadout: launch.loadout,
                seed: launch.seed,
            },
            &mut events,
        );
        let mut report = StepReport::default();
        session.pump(events, PilotInput::default(), &mut report);
        session
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn is_over(&self) -> bool {
        query::resolution(&self.world).is_some()
    }

    pub(crate) fn awaiting_choice(&self) -> bool {
        self.phase.awaiting_choice()
    }

    pub(crate) fn armament(&self) -> Armament {
        Armament {
            mode: self.fire_control.mode(),
            missiles_ready: self.missiles_unlocked && self.fire_control.missiles_left() > 0,
        }
    }

    /// Advances the simulation by one tick under `input`.
    pub(crate) fn step(&mut self, input: PilotInput) -> StepReport {
        let mut report = StepReport::default();
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SteerPlayer {
                direction: input.steer,
            },
            &mut events,
        );
        world::apply(&mut self.world, Command::Tick { dt: self.tick }, &mut events);
        self.pump(events, input, &mut report);
        report
    }

    /// Feeds events to the systems until they stop issuing commands.
    ///
    /// The phase controller runs after the other systems' commands of the
    /// same pass have been applied, so a death caused by this tick's
    /// collisions is seen together with this tick's time step.
    fn pump(&mut self, events: Vec<Event>, input: PilotInput, report: &mut StepReport) {
        report.events.extend(events.iter().cloned());
        let mut pending = events;
        let mut phase_backlog = pending.clone();
        let mut trigger = input.trigger;

        for _ in 0..self.pump_limit {
            let playfield = *query::playfield(&self.world);
            let phase = query::phase(&self.world);
            let view = query::entity_view(&self.world);

            let mut commands = Vec::new();
            self.collision.handle(phase, &view, &mut commands);
            self.spawning
                .handle(&pending, phase, &playfield, &mut commands);
            self.attacks.handle(&pending, phase, &view, &mut commands);
            self.fire_control.handle(
                &pending,
                phase,
                trigger,
                view.player(),
                &mut commands,
                &mut report.notices,
            );
            trigger = TriggerInput::default();

            let mut reactions = Vec::new();
            let reacted = !commands.is_empty();
            for command in commands {
                world::apply(&mut self.world, command, &mut reactions);
            }
            phase_backlog.extend(reactions.iter().cloned());

            let mut phase_commands = Vec::new();
            self.phase.handle(
                &phase_backlog,
                query::live_counts(&self.world),
                &playfield,
                input.choice,
                &mut phase_commands,
            );
            let advanced = !phase_commands.is_empty();
            let mut outcomes = Vec::new();
            for command in phase_commands {
                world::apply(&mut self.world, command, &mut outcomes);
            }

            report.events.extend(reactions.iter().cloned());
            report.events.extend(outcomes.iter().cloned());
            if !reacted && !advanced {
                return;
            }
            phase_backlog = outcomes.clone();
            reactions.extend(outcomes);
            pending = reactions;
        }
        warn!(limit = self.pump_limit, "reactive pump limit reached");
    }
}
