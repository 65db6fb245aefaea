//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::command::Command;
use crate::grid::GridPos;
use crate::id::{LevelId, SequentialIds};
use crate::item::ItemKind;
use crate::level::{Level, TargetSpec};
use crate::machine::{MachineKind, SpawnerMode};
use crate::scheduler::ManualTicks;
use crate::session::Session;
use crate::sim::SimConfig;

// ===========================================================================
// Levels
// ===========================================================================

/// A level with every machine available and no layout.
pub fn open_level(width: u32, height: u32, target: ItemKind, count: u32) -> Level {
    Level {
        id: LevelId(1),
        name: format!("{width}x{height} {target}"),
        description: String::new(),
        grid_width: width,
        grid_height: height,
        target_items: Some(TargetSpec {
            item: target,
            count,
        }),
        available_machines: Vec::new(),
        layout: Vec::new(),
        order: 1,
    }
}

/// 4x1 level asking for two cut items.
pub fn cutting_line_level() -> Level {
    open_level(4, 1, ItemKind::CutMaterial, 2)
}

// ===========================================================================
// Configs
// ===========================================================================

pub fn hold_config() -> SimConfig {
    SimConfig {
        spawner_mode: SpawnerMode::Hold,
        ..SimConfig::default()
    }
}

// ===========================================================================
// Sessions
// ===========================================================================

/// A session driven by [`ManualTicks`] instead of wall time.
pub fn manual_session(level: Level, config: SimConfig) -> Session {
    Session::with_sources(
        level,
        config,
        Box::new(SequentialIds::new()),
        Box::new(ManualTicks::new()),
    )
    .expect("test level is valid")
}

/// Place `kind` at `(x, y)`, panicking if the session rejects it.
pub fn place(session: &mut Session, x: i32, y: i32, kind: MachineKind) {
    let outcome = session.apply(Command::PlaceMachine {
        pos: GridPos::new(x, y),
        kind,
    });
    assert!(outcome.is_applied(), "placing {kind} at ({x}, {y}): {outcome:?}");
}

/// Place a row of machines starting at `(0, y)`.
pub fn place_row(session: &mut Session, y: i32, kinds: &[MachineKind]) {
    for (x, kind) in kinds.iter().enumerate() {
        place(session, x as i32, y, *kind);
    }
}

/// Spawner, cutter, conveyor, sink on [`cutting_line_level`]. Completes on
/// tick 6 with the default config.
pub fn cutting_line_session() -> Session {
    let mut session = Session::new(cutting_line_level(), SimConfig::default())
        .expect("test level is valid");
    place_row(
        &mut session,
        0,
        &[
            MachineKind::Spawner,
            MachineKind::Cutter,
            MachineKind::ConveyorRight,
            MachineKind::Sink,
        ],
    );
    session
}

/// Run `n` ticks. Ticks after the run stops are no-ops.
pub fn run_ticks(session: &mut Session, n: u64) {
    for _ in 0..n {
        session.tick();
    }
}

// ===========================================================================
// Benchmark floors
// ===========================================================================

/// A square level filled with `rows` independent production lines, each
/// spawner -> cutter -> painter -> boxer -> conveyors -> sink. Never
/// completes.
pub fn production_lines_session(rows: u32, width: u32) -> Session {
    let width = width.max(6);
    let mut level = open_level(width, rows.max(1), ItemKind::PackagedProduct, u32::MAX);
    level.name = "bench".to_string();
    let mut session = Session::new(level, SimConfig::default()).expect("bench level is valid");
    for y in 0..rows as i32 {
        place(&mut session, 0, y, MachineKind::Spawner);
        place(&mut session, 1, y, MachineKind::Cutter);
        place(&mut session, 2, y, MachineKind::Painter);
        place(&mut session, 3, y, MachineKind::Boxer);
        for x in 4..width as i32 - 1 {
            place(&mut session, x, y, MachineKind::ConveyorRight);
        }
        place(&mut session, width as i32 - 1, y, MachineKind::Sink);
    }
    session
}
