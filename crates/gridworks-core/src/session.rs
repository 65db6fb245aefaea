//! A run session: the single owner of machines, items and run state.
//!
//! The presentation layer talks to a [`Session`] only through commands
//! ([`Session::apply`]), the clock ([`Session::advance`] / [`Session::tick`])
//! and read-only snapshots ([`Session::snapshot`]). Nothing else mutates
//! session state.
//!
//! # Phases
//!
//! ```text
//! Editing --Start--> Running --Pause--> Paused --Start--> Running
//! Running --(target reached)--> Completed
//! any --Reset--> Editing
//! ```

use crate::collab::{RecordError, RecordReceipt, ScoreRecorder, ScoreSubmission};
use crate::command::{Command, CommandLog, CommandOutcome, RejectReason};
use crate::event::{Event, EventBus};
use crate::fixed::Ticks;
use crate::floor::FactoryFloor;
use crate::grid::GridPos;
use crate::id::{IdSource, SequentialIds};
use crate::item::Item;
use crate::level::{Level, LevelError, LevelRules};
use crate::machine::MachineKind;
use crate::query::FloorSnapshot;
use crate::scheduler::{FixedInterval, TickSource};
use crate::sim::{ConfigError, Phase, RunCompletion, RunState, SimConfig, StateHash, TickStats};
use crate::tick;
use std::time::Duration;

/// Number of applied commands a session remembers by default.
pub const DEFAULT_COMMAND_HISTORY: usize = 256;

/// Why a session could not be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct Session {
    level: Level,
    rules: LevelRules,
    config: SimConfig,
    floor: FactoryFloor,
    items: Vec<Item>,
    run_state: RunState,
    ids: Box<dyn IdSource>,
    clock: Box<dyn TickSource>,
    commands: CommandLog,
    /// Completed run waiting to be handed to a score recorder.
    completion: Option<RunCompletion>,

    /// Simulation events, delivered after every tick and applied command.
    pub event_bus: EventBus,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("level", &self.rules.level)
            .field("config", &self.config)
            .field("machines", &self.floor.len())
            .field("items", &self.items.len())
            .field("run_state", &self.run_state)
            .field("completion", &self.completion)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with a counter id source and a real-time tick source
    /// at the configured interval.
    pub fn new(level: Level, config: SimConfig) -> Result<Self, SessionError> {
        let clock = FixedInterval::new(config.tick_duration());
        Self::with_sources(level, config, Box::new(SequentialIds::new()), Box::new(clock))
    }

    /// Create a session with injected id and tick sources.
    ///
    /// Validates the level and the config first; neither a malformed level
    /// nor an unusable tick interval produces a session. The level's layout
    /// is placed on the floor.
    pub fn with_sources(
        level: Level,
        config: SimConfig,
        ids: Box<dyn IdSource>,
        clock: Box<dyn TickSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let rules = level.rules()?;
        let mut floor = FactoryFloor::new();
        for placement in &level.layout {
            floor.place(placement.pos, placement.kind);
        }
        tracing::info!(
            level = %rules.level,
            name = %level.name,
            machines = floor.len(),
            "session created"
        );
        Ok(Self {
            level,
            rules,
            config,
            floor,
            items: Vec::new(),
            run_state: RunState::new(),
            ids,
            clock,
            commands: CommandLog::with_max_history(DEFAULT_COMMAND_HISTORY),
            completion: None,
            event_bus: EventBus::default(),
        })
    }

    /// Reassemble a session from restored parts. The floor index must
    /// already be rebuilt.
    pub(crate) fn from_parts(
        level: Level,
        rules: LevelRules,
        config: SimConfig,
        floor: FactoryFloor,
        items: Vec<Item>,
        run_state: RunState,
        next_item_id: u64,
    ) -> Self {
        let mut clock = FixedInterval::new(config.tick_duration());
        if run_state.phase == Phase::Running {
            clock.start();
        }
        Self {
            level,
            rules,
            config,
            floor,
            items,
            run_state,
            ids: Box::new(SequentialIds::starting_at(next_item_id)),
            clock: Box::new(clock),
            commands: CommandLog::with_max_history(DEFAULT_COMMAND_HISTORY),
            completion: None,
            event_bus: EventBus::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn rules(&self) -> &LevelRules {
        &self.rules
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn floor(&self) -> &FactoryFloor {
        &self.floor
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn phase(&self) -> Phase {
        self.run_state.phase
    }

    pub fn command_history(&self) -> &[(Ticks, Command)] {
        self.commands.history()
    }

    /// Whether the tick source is currently scheduling ticks.
    pub fn is_ticking(&self) -> bool {
        self.clock.is_active()
    }

    /// The next id the id source will hand out, when it is counter-based.
    pub(crate) fn id_high_water(&self) -> Option<u64> {
        self.ids.high_water()
    }

    /// An owned snapshot for the presentation layer.
    pub fn snapshot(&self) -> FloorSnapshot {
        FloorSnapshot {
            level: self.rules.level,
            grid: self.rules.grid,
            target: self.rules.target,
            machines: self.floor.machines_sorted().into_iter().cloned().collect(),
            items: self.items.clone(),
            run_state: self.run_state,
        }
    }

    /// Deterministic hash over machines, items and run state.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        let machines = self.floor.machines_sorted();
        h.write_u64(machines.len() as u64);
        for m in machines {
            h.write_i32(m.pos.x);
            h.write_i32(m.pos.y);
            h.write_u32(m.kind.tag());
        }
        h.write_u64(self.items.len() as u64);
        for item in &self.items {
            h.write_u64(item.id.0);
            h.write_u32(item.kind.tag());
            h.write_i32(item.pos.x);
            h.write_i32(item.pos.y);
            h.write_fixed64(item.progress);
        }
        h.write_run_state(&self.run_state);
        h.finish()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply a command between ticks.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let outcome = match &command {
            Command::PlaceMachine { pos, kind } => self.place_machine(*pos, *kind),
            Command::RemoveMachine { pos } => self.remove_machine(*pos),
            Command::ClearFloor => self.clear_floor(),
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => {
                self.reset();
                CommandOutcome::Applied
            }
        };

        match outcome {
            CommandOutcome::Applied => {
                tracing::debug!(?command, "command applied");
                self.commands.record(self.run_state.ticks, command);
            }
            CommandOutcome::Rejected(reason) => {
                tracing::warn!(?command, %reason, "command rejected");
            }
        }
        self.event_bus.deliver();
        outcome
    }

    fn place_machine(&mut self, pos: GridPos, kind: MachineKind) -> CommandOutcome {
        if self.run_state.phase == Phase::Running {
            return CommandOutcome::Rejected(RejectReason::Running);
        }
        if !self.rules.grid.contains(pos) {
            return CommandOutcome::Rejected(RejectReason::OutOfBounds);
        }
        if !self.level.allows(kind) {
            return CommandOutcome::Rejected(RejectReason::NotAvailable);
        }

        let tick = self.run_state.ticks;
        let (id, displaced) = self.floor.place(pos, kind);
        if let Some(old) = displaced {
            self.event_bus.emit(Event::MachineRemoved {
                machine: old.id,
                kind: old.kind,
                pos,
                tick,
            });
        }
        self.event_bus.emit(Event::MachinePlaced {
            machine: id,
            kind,
            pos,
            tick,
        });
        CommandOutcome::Applied
    }

    fn remove_machine(&mut self, pos: GridPos) -> CommandOutcome {
        if self.run_state.phase == Phase::Running {
            return CommandOutcome::Rejected(RejectReason::Running);
        }
        match self.floor.remove(pos) {
            Some(old) => {
                self.event_bus.emit(Event::MachineRemoved {
                    machine: old.id,
                    kind: old.kind,
                    pos,
                    tick: self.run_state.ticks,
                });
                CommandOutcome::Applied
            }
            None => CommandOutcome::Rejected(RejectReason::NoMachine),
        }
    }

    fn clear_floor(&mut self) -> CommandOutcome {
        if self.run_state.phase == Phase::Running {
            return CommandOutcome::Rejected(RejectReason::Running);
        }
        self.reset();
        self.floor.clear_all();
        self.event_bus.emit(Event::FloorCleared { tick: 0 });
        CommandOutcome::Applied
    }

    fn start(&mut self) -> CommandOutcome {
        match self.run_state.phase {
            Phase::Editing | Phase::Paused => {
                self.set_phase(Phase::Running);
                self.clock.start();
                CommandOutcome::Applied
            }
            from @ (Phase::Running | Phase::Completed) => {
                CommandOutcome::Rejected(RejectReason::InvalidTransition { from })
            }
        }
    }

    fn pause(&mut self) -> CommandOutcome {
        match self.run_state.phase {
            Phase::Running => {
                self.clock.stop();
                self.set_phase(Phase::Paused);
                CommandOutcome::Applied
            }
            from @ (Phase::Editing | Phase::Paused | Phase::Completed) => {
                CommandOutcome::Rejected(RejectReason::InvalidTransition { from })
            }
        }
    }

    /// Back to editing: no items, zero score, progress and time, and no
    /// pending completion. Machines are kept. Calling it twice is the same as
    /// calling it once.
    fn reset(&mut self) {
        self.clock.stop();
        self.items.clear();
        self.completion = None;
        let from = self.run_state.phase;
        self.run_state = RunState::new();
        if from != Phase::Editing {
            self.event_bus.emit(Event::PhaseChanged {
                from,
                to: Phase::Editing,
                tick: 0,
            });
            tracing::info!(level = %self.rules.level, ?from, "run reset");
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.run_state.phase;
        self.run_state.phase = to;
        self.event_bus.emit(Event::PhaseChanged {
            from,
            to,
            tick: self.run_state.ticks,
        });
        tracing::info!(level = %self.rules.level, ?from, ?to, "phase changed");
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Run one tick. Does nothing and returns `None` unless the session is
    /// running.
    pub fn tick(&mut self) -> Option<TickStats> {
        if self.run_state.phase != Phase::Running {
            return None;
        }

        let outcome = tick::advance(
            &self.floor,
            &self.items,
            &self.rules,
            &self.run_state,
            self.ids.as_mut(),
            &self.config,
        );

        self.items = outcome.items;
        self.run_state = outcome.run_state;
        self.event_bus.emit_all(outcome.events);

        tracing::debug!(
            tick = self.run_state.ticks,
            items = self.items.len(),
            spawned = outcome.stats.spawned,
            consumed = outcome.stats.consumed(),
            discarded = outcome.stats.discarded,
            score = self.run_state.score,
            "tick"
        );

        if let Some(done) = outcome.completion {
            self.clock.stop();
            self.completion = Some(done);
            tracing::info!(
                level = %done.level,
                score = done.score,
                time_taken_secs = done.time_taken_secs,
                "level completed"
            );
        }

        self.event_bus.deliver();
        Some(outcome.stats)
    }

    /// Feed elapsed wall time to the tick source and run every tick that
    /// became due. Stops early if the run completes. Returns the number of
    /// ticks executed.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        let due = self.clock.poll(elapsed);
        let mut ran = 0;
        for _ in 0..due {
            if self.tick().is_none() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// Run ticks until the session stops running or `max_ticks` have run.
    pub fn run_until_stopped(&mut self, max_ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && self.tick().is_some() {
            ran += 1;
        }
        ran
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// The completed run waiting to be submitted, if any.
    pub fn completion(&self) -> Option<&RunCompletion> {
        self.completion.as_ref()
    }

    /// Take the pending completion. Returns it at most once per run.
    pub fn take_completion(&mut self) -> Option<RunCompletion> {
        self.completion.take()
    }

    /// Hand the pending completion to `recorder`.
    ///
    /// On failure the completion stays pending so the caller can retry; the
    /// run state is never touched.
    pub fn submit_score(
        &mut self,
        recorder: &mut dyn ScoreRecorder,
        player_name: &str,
    ) -> Result<RecordReceipt, RecordError> {
        let done = self.completion.ok_or_else(|| RecordError::Invalid {
            field: "run",
            message: "run has not completed".to_string(),
        })?;

        let submission = ScoreSubmission {
            level: done.level,
            player_name: player_name.to_string(),
            score: done.score,
            time_taken: done.time_taken_secs,
        };
        match recorder.record(submission) {
            Ok(receipt) => {
                self.completion = None;
                tracing::info!(level = %done.level, rank = ?receipt.rank, "score recorded");
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(level = %done.level, error = %err, "score submission failed");
                Err(err)
            }
        }
    }
}
