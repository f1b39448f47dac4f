//! slots.rs — Collapses per-slot outage flags into contiguous intervals.

use crate::types::{ClockTime, Interval};

/// Grids with at least this many cells are half-hourly, anything shorter is hourly.
pub const HALF_HOUR_SLOTS: usize = 48;

/// Slot duration in minutes implied by the number of cells in a day.
pub fn slot_step(slot_count: usize) -> u32 {
    if slot_count >= HALF_HOUR_SLOTS { 30 } else { 60 }
}

/// Merges runs of `true` into `[start, end)` intervals, slot 0 being 00:00.
///
/// A run still open at the last slot ends at `(last_index + 1) * step`.
pub fn merge_slots(off: &[bool], step: u32) -> Vec<Interval<ClockTime>> {
    let at = |index: usize| {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        ClockTime::from_minutes(index.saturating_mul(step))
    };

    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;

    for (index, &is_off) in off.iter().enumerate() {
        match (is_off, run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(start)) => {
                intervals.push(Interval::new(at(start), at(index)));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        intervals.push(Interval::new(at(start), at(off.len())));
    }

    intervals
}
