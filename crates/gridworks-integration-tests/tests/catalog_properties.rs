//! Property tests spanning the level catalog, the session and the
//! leaderboard.

use fixed::types::I32F32;
use gridworks_core::collab::{LevelRepository, ScoreRecorder, ScoreSubmission};
use gridworks_core::command::{Command, CommandOutcome, RejectReason};
use gridworks_core::grid::GridPos;
use gridworks_core::id::LevelId;
use gridworks_core::machine::MachineKind;
use gridworks_core::session::Session;
use gridworks_core::sim::{Phase, SimConfig};
use gridworks_data::{Leaderboard, LevelCatalog, MAX_HIGH_SCORES};
use proptest::prelude::*;

fn arb_level_id() -> impl Strategy<Value = LevelId> {
    (1..=4u32).prop_map(LevelId)
}

fn arb_placement() -> impl Strategy<Value = (i32, i32, MachineKind)> {
    (
        -2..14i32,
        -2..14i32,
        proptest::sample::select(MachineKind::ALL.to_vec()),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// A placement is accepted exactly when it is in bounds and offered by
    /// the level.
    #[test]
    fn placement_follows_bounds_and_availability(
        id in arb_level_id(),
        placements in proptest::collection::vec(arb_placement(), 1..40),
    ) {
        let catalog = LevelCatalog::builtin();
        let level = catalog.get(id).unwrap();
        let mut session = Session::new(level.clone(), SimConfig::default()).unwrap();

        for (x, y, kind) in placements {
            let pos = GridPos::new(x, y);
            let outcome = session.apply(Command::PlaceMachine { pos, kind });
            let expected = if !level.grid().contains(pos) {
                CommandOutcome::Rejected(RejectReason::OutOfBounds)
            } else if !level.allows(kind) {
                CommandOutcome::Rejected(RejectReason::NotAvailable)
            } else {
                CommandOutcome::Applied
            };
            prop_assert_eq!(outcome, expected);
        }
        prop_assert!(session.floor().is_consistent());
    }

    /// Elapsed time is exactly half a second per tick, whatever the floor.
    #[test]
    fn elapsed_tracks_ticks_exactly(
        id in arb_level_id(),
        placements in proptest::collection::vec(arb_placement(), 0..30),
        ticks in 1..60u64,
    ) {
        let catalog = LevelCatalog::builtin();
        let mut session = Session::new(catalog.get(id).unwrap(), SimConfig::default()).unwrap();
        for (x, y, kind) in placements {
            session.apply(Command::PlaceMachine { pos: GridPos::new(x, y), kind });
        }
        session.apply(Command::Start);
        let ran = session.run_until_stopped(ticks);

        prop_assert_eq!(session.run_state().ticks, ran);
        prop_assert_eq!(
            session.run_state().elapsed,
            I32F32::from_num(ran) / I32F32::from_num(2)
        );
        if ran < ticks {
            prop_assert_eq!(session.phase(), Phase::Completed);
        }
    }

    /// The leaderboard never lists more than ten entries and always lists
    /// them best first.
    #[test]
    fn leaderboard_top_is_sorted_and_bounded(
        entries in proptest::collection::vec((arb_level_id(), 0..2_000u64, 0..600u32), 0..60),
    ) {
        let mut board = Leaderboard::new();
        for (i, (level, score, time_taken)) in entries.iter().enumerate() {
            board
                .record(ScoreSubmission {
                    level: *level,
                    player_name: format!("p{i}"),
                    score: *score,
                    time_taken: *time_taken,
                })
                .unwrap();
        }

        for level in LevelCatalog::builtin().list() {
            let top = board.top(level.id);
            let submitted = entries.iter().filter(|(l, _, _)| *l == level.id).count();
            prop_assert_eq!(top.len(), submitted.min(MAX_HIGH_SCORES));
            for pair in top.windows(2) {
                let key = |e: &gridworks_data::HighScore| (e.score, e.time_taken);
                prop_assert!(key(&pair[0]) >= key(&pair[1]));
            }
        }
    }
}
