//! Gridworks Core -- the tick engine for grid-based factory puzzles.
//!
//! A player places machines (conveyors, spawners, sinks, cutters, painters,
//! boxers) on a bounded grid. Once started, a periodic tick moves items
//! across the grid, transforms them, and scores the ones that reach a sink.
//! A run completes when enough items of the level's target kind have been
//! sunk.
//!
//! # Tick Pipeline
//!
//! Each call to [`session::Session::tick`] runs [`tick::advance`], a pure
//! function of the floor, the items and the run state:
//!
//! 1. **Occupancy** -- index machines by cell.
//! 2. **Process** -- every item acts on the machine under it.
//! 3. **Boundary** -- items stepping off the grid are dropped.
//! 4. **Spawn** -- free spawner cells create a raw item.
//! 5. **Commit** -- score and target progress are applied.
//! 6. **Clock** -- elapsed time grows by one tick interval.
//!
//! # Command / Query Split
//!
//! The session owns all mutable state. The presentation layer edits it only
//! through [`command::Command`] values and reads it only through
//! [`query::FloorSnapshot`]:
//!
//! ```rust,ignore
//! let mut session = Session::new(level, SimConfig::default())?;
//! session.apply(Command::PlaceMachine { pos: GridPos::new(0, 0), kind: MachineKind::Spawner });
//! session.apply(Command::Start);
//! session.advance(frame_time);
//! let view = session.snapshot();
//! ```
//!
//! # Key Types
//!
//! - [`session::Session`] -- Owner of floor, items and run state.
//! - [`machine::MachineKind`] -- Closed set of machine kinds and their item rules.
//! - [`item::ItemKind`] -- Closed set of item kinds.
//! - [`level::Level`] -- Level records and their validation.
//! - [`scheduler::TickSource`] -- Injected periodic tick source.
//! - [`id::IdSource`] -- Injected item id generator.
//! - [`collab`] -- Level repository and score recorder interfaces.
//! - [`serialize`] / [`replay`] -- Versioned snapshots and replay logs via bitcode.

pub mod collab;
pub mod command;
pub mod event;
pub mod fixed;
pub mod floor;
pub mod grid;
pub mod id;
pub mod item;
pub mod level;
pub mod machine;
pub mod query;
pub mod replay;
pub mod scheduler;
pub mod serialize;
pub mod session;
pub mod sim;
pub mod tick;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
