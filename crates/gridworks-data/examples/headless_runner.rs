//! Headless runner: plays every level with a straight production line and
//! records the results on a leaderboard.
//!
//! Usage: `cargo run -p gridworks-data --example headless_runner [levels_dir]`
//!
//! Without a directory the built-in levels are used. Set `RUST_LOG=debug` to
//! see per-tick summaries.

use gridworks_core::collab::LevelRepository;
use gridworks_core::command::{Command, CommandOutcome};
use gridworks_core::grid::GridPos;
use gridworks_core::item::ItemKind;
use gridworks_core::level::Level;
use gridworks_core::machine::MachineKind;
use gridworks_core::session::Session;
use gridworks_core::sim::{Phase, SimConfig};
use gridworks_data::{Leaderboard, LevelCatalog};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error("{level}: cannot place {kind} at x={x}: {outcome:?}")]
    Placement {
        level: String,
        kind: MachineKind,
        x: i32,
        outcome: CommandOutcome,
    },
}

/// Machines needed, in order, to turn raw material into `target`.
fn processing_chain(target: ItemKind) -> &'static [MachineKind] {
    match target {
        ItemKind::RawMaterial | ItemKind::Trash => &[],
        ItemKind::CutMaterial => &[MachineKind::Cutter],
        ItemKind::PaintedMaterial => &[MachineKind::Cutter, MachineKind::Painter],
        ItemKind::PackagedProduct => &[
            MachineKind::Cutter,
            MachineKind::Painter,
            MachineKind::Boxer,
        ],
    }
}

/// Lay a spawner, the processing chain and a sink along the bottom row, with
/// conveyors filling the gap. A sink already placed by the level is reused if
/// it ends the row.
fn build_line(session: &mut Session, level: &Level) -> Result<(), RunnerError> {
    let rules = *session.rules();
    let y = rules.grid.height as i32 - 1;
    let last = rules.grid.width as i32 - 1;

    let mut row = vec![MachineKind::Spawner];
    row.extend_from_slice(processing_chain(rules.target.item));
    let sink_present = session
        .floor()
        .machine_at(GridPos::new(last, y))
        .is_some_and(|m| m.kind == MachineKind::Sink);

    for x in 0..=last {
        let kind = match row.get(x as usize) {
            Some(kind) => *kind,
            None if x == last && sink_present => continue,
            None if x == last => MachineKind::Sink,
            None => MachineKind::ConveyorRight,
        };
        let outcome = session.apply(Command::PlaceMachine {
            pos: GridPos::new(x, y),
            kind,
        });
        if !outcome.is_applied() {
            return Err(RunnerError::Placement {
                level: level.name.clone(),
                kind,
                x,
                outcome,
            });
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let catalog = match std::env::args().nth(1).map(PathBuf::from) {
        Some(dir) => match LevelCatalog::from_dir(&dir) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "failed to load levels");
                std::process::exit(1);
            }
        },
        None => LevelCatalog::builtin(),
    };

    let mut leaderboard = Leaderboard::new();
    let frame = Duration::from_millis(16);

    for level in catalog.list() {
        let mut session = match Session::new(level.clone(), SimConfig::default()) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "skipping level");
                continue;
            }
        };
        if let Err(e) = build_line(&mut session, &level) {
            tracing::warn!(error = %e, "skipping level");
            continue;
        }

        session.apply(Command::Start);
        // Drive the session the way a frame loop would, with a ceiling of
        // ten simulated minutes.
        let mut simulated = Duration::ZERO;
        while session.phase() == Phase::Running && simulated < Duration::from_secs(600) {
            session.advance(frame);
            simulated += frame;
        }

        match session.submit_score(&mut leaderboard, "headless") {
            Ok(receipt) => {
                let run = session.run_state();
                tracing::info!(
                    level = %level.name,
                    score = run.score,
                    seconds = run.elapsed_secs(),
                    rank = ?receipt.rank,
                    "level cleared"
                );
            }
            Err(e) => tracing::warn!(level = %level.name, error = %e, "level not cleared"),
        }
    }

    for level in catalog.list() {
        for (rank, entry) in leaderboard.top(level.id).iter().enumerate() {
            println!(
                "{:<16} #{} {:<10} {:>6} pts {:>4}s",
                level.name,
                rank + 1,
                entry.player_name,
                entry.score,
                entry.time_taken
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworks_core::command::RejectReason;
    use gridworks_core::id::LevelId;

    #[test]
    fn builds_a_winning_line_on_every_builtin_level() {
        let catalog = LevelCatalog::builtin();
        for level in catalog.list() {
            let mut session = Session::new(level.clone(), SimConfig::default()).unwrap();
            build_line(&mut session, &level).unwrap();
            session.apply(Command::Start);
            session.run_until_stopped(1_000);
            assert_eq!(session.phase(), Phase::Completed, "{}", level.name);
        }
    }

    #[test]
    fn locked_machine_is_reported_as_a_placement_error() {
        let mut level = LevelCatalog::builtin().get(LevelId(2)).unwrap();
        level.available_machines = vec!["spawner".into(), "sink".into()];
        let mut session = Session::new(level.clone(), SimConfig::default()).unwrap();

        let err = build_line(&mut session, &level).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Placement {
                kind: MachineKind::Cutter,
                x: 1,
                outcome: CommandOutcome::Rejected(RejectReason::NotAvailable),
                ..
            }
        ));
    }
}
