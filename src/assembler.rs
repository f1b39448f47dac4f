//! assembler.rs — Turns raw source payloads into the canonical payload.
//!
//! Both pipelines are pure: fetching happens before, in the worker.

use crate::config::Address;
use crate::day_events::build_day_events;
use crate::error::{ScheduleError, ScheduleResult};
use crate::groups::{GroupTarget, filter_events};
use crate::outage::resolve;
use crate::region::find_region_schedule;
use crate::slots::{merge_slots, slot_step};
use crate::table::{QueueReply, parse_queue_code, parse_slot_flags};
use crate::types::{CanonicalPayload, ClockTime, Interval};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::debug;

/// Queue code for an address, or a resolution failure.
pub fn resolve_queue(address: &Address, reply: &QueueReply) -> ScheduleResult<String> {
    parse_queue_code(reply).ok_or_else(|| ScheduleError::Resolution(format!("queue for '{address}'")))
}

/// Table pipeline: HTML grid row → slot flags → intervals → status at local `now`.
pub fn assemble_table(
    address: &Address,
    queue_code: &str,
    html: &str,
    markers: &[String],
    now: DateTime<Utc>,
    tz: Tz,
) -> ScheduleResult<CanonicalPayload<ClockTime>> {
    let flags = parse_slot_flags(html, queue_code, markers)?;
    let step = slot_step(flags.len());
    let today = merge_slots(&flags, step);
    let local_now = ClockTime::from(now.with_timezone(&tz).time());

    debug!(
        "[TABLE {}] {} slots of {} min, {} intervals, local time {}",
        queue_code,
        flags.len(),
        step,
        today.len(),
        local_now
    );

    Ok(CanonicalPayload {
        address: address.to_string(),
        queue_id: queue_code.to_owned(),
        next: resolve(&today, local_now),
        today,
        updated_at: now,
    })
}

/// Region pipeline: today's and tomorrow's group maps → events for `group` → status at `now`.
///
/// Tomorrow's events are appended to `today` without a day marker; presentation
/// sees one sorted list spanning both dates.
pub fn assemble_region(
    region: &str,
    region_code: &str,
    group: &str,
    document: &Value,
    now: DateTime<Utc>,
    tz: Tz,
) -> ScheduleResult<CanonicalPayload<DateTime<Utc>>> {
    let target = GroupTarget::parse(group)?;
    let schedule = find_region_schedule(document, region_code)?;
    let today_date = now.with_timezone(&tz).date_naive();

    let mut events = Vec::new();
    if let Some(day) = &schedule.today {
        events.extend(build_day_events(day, today_date, tz));
    }
    if let Some(day) = schedule.tomorrow.as_ref().filter(|d| !d.is_empty()) {
        match today_date.succ_opt() {
            Some(tomorrow) => events.extend(build_day_events(day, tomorrow, tz)),
            None => debug!("[REGION {}] No calendar day after {}", region_code, today_date),
        }
    }

    let mut events = filter_events(events, &target);
    events.sort_by_key(|event| event.start);
    let today: Vec<Interval<DateTime<Utc>>> = events.iter().map(|e| e.interval()).collect();

    debug!(
        "[REGION {}] {} events for group {}",
        region_code,
        today.len(),
        target
    );

    Ok(CanonicalPayload {
        address: region.to_owned(),
        queue_id: group.to_owned(),
        next: resolve(&today, now),
        today,
        updated_at: now,
    })
}
