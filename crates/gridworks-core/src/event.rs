//! Typed simulation events with a fixed-capacity ring buffer.
//!
//! The tick function returns the events it produced; the session pushes them
//! into its [`EventBus`] and delivers them to listeners once the tick has
//! been fully committed. Edit and run-control commands emit events the same
//! way.
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]. Suppressed
//! events are neither buffered nor delivered.

use crate::fixed::Ticks;
use crate::grid::GridPos;
use crate::id::{ItemId, MachineId};
use crate::item::ItemKind;
use crate::machine::MachineKind;
use crate::sim::{Phase, RunCompletion};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Something that happened on the floor, stamped with its tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Floor edits --
    MachinePlaced {
        machine: MachineId,
        kind: MachineKind,
        pos: GridPos,
        tick: Ticks,
    },
    MachineRemoved {
        machine: MachineId,
        kind: MachineKind,
        pos: GridPos,
        tick: Ticks,
    },
    FloorCleared {
        tick: Ticks,
    },

    // -- Run control --
    PhaseChanged {
        from: Phase,
        to: Phase,
        tick: Ticks,
    },

    // -- Items --
    ItemSpawned {
        item: ItemId,
        pos: GridPos,
        tick: Ticks,
    },
    ItemTransformed {
        item: ItemId,
        from: ItemKind,
        to: ItemKind,
        tick: Ticks,
    },
    ItemConsumed {
        item: ItemId,
        kind: ItemKind,
        scored_as_target: bool,
        tick: Ticks,
    },
    ItemDiscarded {
        item: ItemId,
        tick: Ticks,
    },

    // -- Terminal --
    RunCompleted {
        completion: RunCompletion,
        tick: Ticks,
    },
}

/// Tag identifying an [`Event`] variant without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MachinePlaced,
    MachineRemoved,
    FloorCleared,
    PhaseChanged,
    ItemSpawned,
    ItemTransformed,
    ItemConsumed,
    ItemDiscarded,
    RunCompleted,
}

/// Number of [`EventKind`] variants.
const EVENT_KIND_COUNT: usize = 9;

impl Event {
    /// Payload-free tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MachinePlaced { .. } => EventKind::MachinePlaced,
            Event::MachineRemoved { .. } => EventKind::MachineRemoved,
            Event::FloorCleared { .. } => EventKind::FloorCleared,
            Event::PhaseChanged { .. } => EventKind::PhaseChanged,
            Event::ItemSpawned { .. } => EventKind::ItemSpawned,
            Event::ItemTransformed { .. } => EventKind::ItemTransformed,
            Event::ItemConsumed { .. } => EventKind::ItemConsumed,
            Event::ItemDiscarded { .. } => EventKind::ItemDiscarded,
            Event::RunCompleted { .. } => EventKind::RunCompleted,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// Fixed-capacity ring of recent events. Slots are allocated up front and
/// the oldest event is overwritten when a new one arrives on a full ring.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Next slot to write.
    head: usize,
    len: usize,
    /// Events pushed since creation, overwritten ones included.
    total_written: u64,
}

impl EventBuffer {
    /// Buffer holding at most `capacity` events.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Append `event`, overwriting the oldest one once the buffer is full.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events overwritten before anyone read them.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.capacity() as u64)
    }

    /// Buffered events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        // Once full, `head` is also the oldest entry.
        let start = if self.len < self.capacity() { 0 } else { self.head };
        (0..self.len).filter_map(move |i| {
            self.events[(start + i) % self.capacity()].as_ref()
        })
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Callback invoked with each delivered event.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Default number of delivered events kept for inspection.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Buffers events between delivery points and fans them out to listeners.
///
/// Pending events are unbounded and drained completely on every delivery,
/// so listeners see every event of a tick however many it produces. The
/// last `capacity` delivered events stay readable through [`EventBus::recent`].
pub struct EventBus {
    pending: Vec<Event>,
    recent: EventBuffer,
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: Vec<Listener>,
    delivered: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("recent", &self.recent)
            .field("suppressed", &self.suppressed)
            .field("listeners", &self.listeners.len())
            .field("delivered", &self.delivered)
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Vec::new(),
            recent: EventBuffer::new(capacity),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Vec::new(),
            delivered: 0,
        }
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Buffer an event for the next delivery. Suppressed kinds are dropped.
    pub fn emit(&mut self, event: Event) {
        if self.is_suppressed(event.kind()) {
            return;
        }
        self.pending.push(event);
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Deliver every buffered event to every listener, oldest first, leaving
    /// nothing pending.
    pub fn deliver(&mut self) {
        for event in self.pending.drain(..) {
            for listener in &mut self.listeners {
                listener(&event);
            }
            self.recent.push(event);
            self.delivered += 1;
        }
    }

    /// Events buffered but not yet delivered.
    pub fn pending(&self) -> impl Iterator<Item = &Event> + '_ {
        self.pending.iter()
    }

    /// The most recently delivered events, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &Event> + '_ {
        self.recent.iter()
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn discarded(n: u64) -> Event {
        Event::ItemDiscarded {
            item: ItemId(n),
            tick: n,
        }
    }

    #[test]
    fn ring_buffer_drops_oldest() {
        let mut buf = EventBuffer::new(3);
        for n in 0..5 {
            buf.push(discarded(n));
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.dropped_count(), 2);
        let ids: Vec<_> = buf
            .iter()
            .map(|e| match e {
                Event::ItemDiscarded { item, .. } => item.0,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut buf = EventBuffer::new(0);
        buf.push(discarded(1));
        buf.push(discarded(2));
        assert_eq!(buf.capacity(), 1);
        assert_eq!(buf.iter().next(), Some(&discarded(2)));
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buf = EventBuffer::new(4);
        buf.push(discarded(1));
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.iter().count(), 0);
        assert_eq!(buf.total_written(), 1);
    }

    #[test]
    fn deliver_reaches_every_listener_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new(16);
        let a = Rc::clone(&seen);
        bus.subscribe(Box::new(move |e| a.borrow_mut().push(("a", e.clone()))));
        let b = Rc::clone(&seen);
        bus.subscribe(Box::new(move |e| b.borrow_mut().push(("b", e.clone()))));

        bus.emit(discarded(1));
        bus.emit(discarded(2));
        bus.deliver();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], ("a", discarded(1)));
        assert_eq!(seen[1], ("b", discarded(1)));
        assert_eq!(seen[2], ("a", discarded(2)));
        assert_eq!(bus.delivered_count(), 2);
        assert_eq!(bus.pending().count(), 0);
    }

    #[test]
    fn delivery_is_not_limited_by_history_capacity() {
        let count = Rc::new(RefCell::new(0u64));
        let mut bus = EventBus::new(16);
        let c = Rc::clone(&count);
        bus.subscribe(Box::new(move |_| *c.borrow_mut() += 1));

        bus.emit_all((0..2_000).map(discarded));
        assert_eq!(bus.pending().count(), 2_000);
        bus.deliver();

        assert_eq!(*count.borrow(), 2_000);
        assert_eq!(bus.delivered_count(), 2_000);
        assert_eq!(bus.pending().count(), 0);
        assert_eq!(bus.recent().count(), 16);
        assert_eq!(bus.recent().next(), Some(&discarded(1_984)));
        assert_eq!(bus.recent().last(), Some(&discarded(1_999)));
    }

    #[test]
    fn suppressed_kinds_are_not_buffered() {
        let mut bus = EventBus::default();
        bus.suppress(EventKind::ItemDiscarded);
        bus.emit(discarded(1));
        bus.emit(Event::FloorCleared { tick: 0 });
        assert_eq!(bus.pending().count(), 1);

        bus.unsuppress(EventKind::ItemDiscarded);
        bus.emit(discarded(2));
        assert_eq!(bus.pending().count(), 2);
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(discarded(0).kind(), EventKind::ItemDiscarded);
        assert_eq!(
            Event::FloorCleared { tick: 3 }.kind(),
            EventKind::FloorCleared
        );
    }
}
