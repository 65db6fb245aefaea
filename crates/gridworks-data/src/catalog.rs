//! The levels that ship with the game.

use gridworks_core::id::LevelId;
use gridworks_core::item::ItemKind;
use gridworks_core::level::{Level, TargetSpec};

const CONVEYORS: [&str; 4] = ["conveyor_right", "conveyor_down", "conveyor_left", "conveyor_up"];

fn seeded(
    id: u32,
    name: &str,
    description: &str,
    size: u32,
    target: ItemKind,
    count: u32,
    machines: &[&str],
) -> Level {
    Level {
        id: LevelId(id),
        name: name.to_string(),
        description: description.to_string(),
        grid_width: size,
        grid_height: size,
        target_items: Some(TargetSpec {
            item: target,
            count,
        }),
        available_machines: machines
            .iter()
            .chain(CONVEYORS.iter())
            .map(|s| s.to_string())
            .collect(),
        layout: Vec::new(),
        order: id as i32,
    }
}

/// The four built-in levels, in play order.
pub fn builtin_levels() -> Vec<Level> {
    vec![
        seeded(
            1,
            "The Beginning",
            "Produce 10 Raw Materials. Use a Spawner and a Sink.",
            10,
            ItemKind::RawMaterial,
            10,
            &["spawner", "sink"],
        ),
        seeded(
            2,
            "Cutting Edge",
            "Produce 10 Cut Materials. You'll need a Cutter.",
            10,
            ItemKind::CutMaterial,
            10,
            &["spawner", "sink", "cutter"],
        ),
        seeded(
            3,
            "Paint Job",
            "Produce 10 Painted Materials. Cut them first, then Paint them.",
            10,
            ItemKind::PaintedMaterial,
            10,
            &["spawner", "sink", "cutter", "painter"],
        ),
        seeded(
            4,
            "Full Production",
            "Produce 5 Packaged Products. Cut -> Paint -> Box.",
            12,
            ItemKind::PackagedProduct,
            5,
            &["spawner", "sink", "cutter", "painter", "boxer"],
        ),
    ]
}
