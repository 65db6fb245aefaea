//! The per-tick state transition.
//!
//! [`advance`] is a pure function of the floor, the current items, the level
//! rules, the run state, and the id source. It never reads a clock and never
//! touches the session; the session commits the returned [`TickOutcome`].
//!
//! # Steps
//!
//! 1. **Occupancy** -- index machines by cell.
//! 2. **Process** -- act on each item with the machine on its current cell
//!    (move, transform, consume, or stay).
//! 3. **Boundary** -- drop items whose next cell is off the grid.
//! 4. **Spawn** -- each spawner whose cell is free of survivors creates one
//!    raw item on its own cell.
//! 5. **Commit** -- apply the score and progress deltas.
//! 6. **Clock** -- add one tick interval to elapsed time.
//!
//! Win detection runs after the commit and fires at most once per run.

use crate::event::Event;
use crate::floor::FactoryFloor;
use crate::grid::GridPos;
use crate::id::IdSource;
use crate::item::{Item, ItemKind};
use crate::level::LevelRules;
use crate::machine::{ItemAction, MachineKind};
use crate::sim::{
    Phase, RunCompletion, RunState, SCRAP_POINTS, SimConfig, TARGET_POINTS, TickStats,
};
use std::collections::{HashMap, HashSet};

/// Everything one tick produced. The caller replaces its items and run
/// state with these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub items: Vec<Item>,
    pub run_state: RunState,
    pub stats: TickStats,
    pub events: Vec<Event>,
    /// Set on the tick that completed the run, and only that tick.
    pub completion: Option<RunCompletion>,
}

/// Advance the simulation by one tick.
pub fn advance(
    floor: &FactoryFloor,
    items: &[Item],
    rules: &LevelRules,
    run_state: &RunState,
    ids: &mut dyn IdSource,
    config: &SimConfig,
) -> TickOutcome {
    let tick = run_state.ticks + 1;
    let mut stats = TickStats::default();
    let mut events = Vec::new();

    // 1. Occupancy index.
    let occupancy: HashMap<GridPos, MachineKind> =
        floor.iter().map(|m| (m.pos, m.kind)).collect();

    // 2-3. Process existing items, then apply the boundary check.
    let mut next_items = Vec::with_capacity(items.len() + 1);
    for item in items {
        let action = match occupancy.get(&item.pos) {
            Some(kind) => kind.act(item.kind, config.spawner_mode),
            None => ItemAction::Stay,
        };

        let (pos, kind) = match action {
            ItemAction::Stay => (Some(item.pos), item.kind),
            ItemAction::Move { dir, kind } => (item.pos.step(dir), kind),
            ItemAction::Consume => {
                let scored_as_target = item.kind == rules.target.item;
                if scored_as_target {
                    stats.consumed_target += 1;
                    stats.score_delta += TARGET_POINTS;
                } else {
                    stats.consumed_scrap += 1;
                    stats.score_delta += SCRAP_POINTS;
                }
                events.push(Event::ItemConsumed {
                    item: item.id,
                    kind: item.kind,
                    scored_as_target,
                    tick,
                });
                continue;
            }
        };

        let Some(pos) = pos.filter(|&p| rules.grid.contains(p)) else {
            stats.discarded += 1;
            events.push(Event::ItemDiscarded { item: item.id, tick });
            continue;
        };

        if kind != item.kind {
            events.push(Event::ItemTransformed {
                item: item.id,
                from: item.kind,
                to: kind,
                tick,
            });
        }
        next_items.push(Item {
            pos,
            kind,
            ..item.clone()
        });
    }

    // 4. Spawn onto free spawner cells, in row-major order.
    let occupied: HashSet<GridPos> = next_items.iter().map(|i| i.pos).collect();
    for spawner in floor
        .machines_sorted()
        .into_iter()
        .filter(|m| m.kind == MachineKind::Spawner)
    {
        if occupied.contains(&spawner.pos) {
            continue;
        }
        let id = ids.next_item_id();
        next_items.push(Item::new(id, ItemKind::RawMaterial, spawner.pos));
        stats.spawned += 1;
        events.push(Event::ItemSpawned {
            item: id,
            pos: spawner.pos,
            tick,
        });
    }

    // 5. Commit score and progress. 6. Advance the clock.
    let mut next_state = RunState {
        score: run_state.score + stats.score_delta,
        target_progress: run_state.target_progress + stats.consumed_target,
        elapsed: run_state.elapsed.saturating_add(config.tick_seconds()),
        ticks: tick,
        ..*run_state
    };

    // Win detection.
    let mut completion = None;
    if next_state.phase == Phase::Running && next_state.target_progress >= rules.target.count {
        next_state.phase = Phase::Completed;
        let done = RunCompletion {
            level: rules.level,
            score: next_state.score,
            time_taken_secs: next_state.elapsed_secs(),
        };
        events.push(Event::PhaseChanged {
            from: Phase::Running,
            to: Phase::Completed,
            tick,
        });
        events.push(Event::RunCompleted {
            completion: done,
            tick,
        });
        completion = Some(done);
    }

    TickOutcome {
        items: next_items,
        run_state: next_state,
        stats,
        events,
        completion,
    }
}
