//! Per-slot change detection.
//!
//! Keeps exactly one previous sample per logical slot and turns each
//! fresh sample into the list of axis and button deltas since then.
//! Comparison is exact byte equality, so a single least-significant-bit
//! wiggle produces an event; filtering is a consumer concern.

use crate::curve::CurveTable;
use crate::driver::poller::SLOT_COUNT;
use crate::driver::sample::{ButtonMap, RawSample};

/// One normalized input change.
///
/// Within one [`DiffEngine::update`] call, axis events always precede
/// button events, and each group follows the fixed channel / button-map
/// declaration order, not the order in which bits happen to differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    AxisChanged {
        /// Channel index, `0..=5` in `lx, ly, rx, ry, lt, rt` order.
        axis: u8,
        /// Curve-mapped axis position.
        value: i16,
        /// Monotonic nanoseconds since pump start.
        timestamp: u64,
    },
    ButtonChanged {
        /// Index of the entry in the [`ButtonMap`].
        button: u8,
        pressed: bool,
        timestamp: u64,
    },
}

/// Change detection over the four logical slots.
///
/// Slot state starts zeroed rather than "unknown": the first update for a
/// slot deliberately resyncs, emitting an event for every axis byte and
/// pressed button that differs from zero. There is no "device absent"
/// mode here; a slot that produced no sample this tick is simply not
/// updated and emits nothing.
#[derive(Clone, Debug)]
pub struct DiffEngine {
    slots: [RawSample; SLOT_COUNT],
    button_map: ButtonMap,
}

impl DiffEngine {
    pub fn new(button_map: ButtonMap) -> Self {
        Self {
            slots: [RawSample::default(); SLOT_COUNT],
            button_map,
        }
    }

    /// Diff `raw` against the stored sample for `slot`, store it, and
    /// return the changes in delivery order. Pure state bookkeeping, no
    /// I/O, cannot fail.
    ///
    /// # Panics
    ///
    /// Panics when `slot >= 4`; the poller has already bounds-checked any
    /// slot that produced a sample.
    pub fn update(
        &mut self,
        slot: usize,
        raw: RawSample,
        table: &CurveTable,
        timestamp: u64,
    ) -> Vec<ChangeEvent> {
        let prev = &mut self.slots[slot];
        let mut events = Vec::new();

        let channels = [
            (&mut prev.lx, raw.lx),
            (&mut prev.ly, raw.ly),
            (&mut prev.rx, raw.rx),
            (&mut prev.ry, raw.ry),
            (&mut prev.lt, raw.lt),
            (&mut prev.rt, raw.rt),
        ];
        for (axis, (stored, new)) in channels.into_iter().enumerate() {
            if *stored != new {
                events.push(ChangeEvent::AxisChanged {
                    axis: axis as u8,
                    value: table.lookup(new),
                    timestamp,
                });
                *stored = new;
            }
        }

        let changed = prev.buttons ^ raw.buttons;
        prev.buttons = raw.buttons;
        if changed != 0 {
            for (button, mask) in self.button_map.iter() {
                if changed & mask != 0 {
                    events.push(ChangeEvent::ButtonChanged {
                        button: button as u8,
                        pressed: raw.buttons & mask != 0,
                        timestamp,
                    });
                }
            }
        }

        events
    }
}
