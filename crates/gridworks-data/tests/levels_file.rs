//! The shipped `levels/levels.ron` file loads and agrees with the built-in
//! catalog.

use gridworks_core::collab::LevelRepository;
use gridworks_core::command::Command;
use gridworks_core::grid::GridPos;
use gridworks_core::id::LevelId;
use gridworks_core::machine::MachineKind;
use gridworks_core::session::Session;
use gridworks_core::sim::{Phase, SimConfig};
use gridworks_data::{LevelCatalog, builtin_levels, load_levels};
use std::path::PathBuf;

fn levels_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("levels")
}

#[test]
fn shipped_levels_load() {
    let levels = load_levels(&levels_dir()).unwrap();
    assert_eq!(levels.len(), 5);
    let orders: Vec<_> = levels.iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);
}

#[test]
fn shipped_campaign_matches_builtin_levels() {
    let loaded = LevelCatalog::from_dir(&levels_dir()).unwrap();
    for builtin in builtin_levels() {
        let file = loaded.get(builtin.id).unwrap();
        assert_eq!(file.name, builtin.name);
        assert_eq!(file.description, builtin.description);
        assert_eq!(file.grid(), builtin.grid());
        assert_eq!(file.target_items, builtin.target_items);
        // Family names in the file expand to the same machine set.
        assert_eq!(file.offered_machines(), builtin.offered_machines());
    }
}

#[test]
fn layout_level_starts_with_its_sink() {
    let catalog = LevelCatalog::from_dir(&levels_dir()).unwrap();
    let detour = catalog.get(LevelId(5)).unwrap();

    let session = Session::new(detour, SimConfig::default()).unwrap();
    assert_eq!(session.floor().len(), 1);
    assert_eq!(
        session.floor().iter().next().map(|m| m.kind),
        Some(MachineKind::Sink)
    );
}

#[test]
fn layout_level_is_winnable_after_clearing_the_floor() {
    let catalog = LevelCatalog::from_dir(&levels_dir()).unwrap();
    let detour = catalog.get(LevelId(5)).unwrap();
    let mut session = Session::new(detour, SimConfig::default()).unwrap();

    assert!(session.apply(Command::ClearFloor).is_applied());
    assert!(session.floor().is_empty());

    let row = [
        MachineKind::Spawner,
        MachineKind::Cutter,
        MachineKind::Painter,
        MachineKind::Boxer,
        MachineKind::ConveyorRight,
        MachineKind::ConveyorRight,
        MachineKind::ConveyorRight,
        MachineKind::Sink,
    ];
    for (x, kind) in row.into_iter().enumerate() {
        let outcome = session.apply(Command::PlaceMachine {
            pos: GridPos::new(x as i32, 7),
            kind,
        });
        assert!(outcome.is_applied(), "{kind} at x={x}: {outcome:?}");
    }
    session.apply(Command::Start);

    // Width 8, three items: the last one is sunk on tick 11.
    assert_eq!(session.run_until_stopped(100), 11);
    assert_eq!(session.phase(), Phase::Completed);
}
