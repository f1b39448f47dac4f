//! day_events.rs — Anchors hour-of-day schedule records to absolute UTC instants.
//!
//! Upstream encodes times as hours from local midnight: `8`, `13.5`, `"9,5"`.
//! Only whole and half hours exist; any other fraction rounds down to the hour.

use crate::error::MalformedRecord;
use crate::groups::GroupKey;
use crate::types::{DayScheduleEvent, EventType};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

const HALF_HOUR_TOLERANCE: f64 = 1e-6;

/// One day of the regional schedule: group key → list of raw interval records.
///
/// Groups stay in document order so events with equal starts keep upstream order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub groups: Map<String, Value>,
}

impl DaySchedule {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawInterval {
    start: Option<Value>,
    end: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Normalized hour-of-day, `00:00..=24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourValue {
    pub hour: u32,
    pub minute: u32,
}

impl HourValue {
    pub fn from_json(value: &Value) -> Result<Self, MalformedRecord> {
        let hours = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            _ => None,
        };
        hours
            .and_then(Self::from_hours)
            .ok_or_else(|| MalformedRecord::InvalidHour(value.to_string()))
    }

    fn from_hours(hours: f64) -> Option<Self> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return None;
        }
        let whole = hours.trunc();
        let minute = if ((hours - whole) - 0.5).abs() < HALF_HOUR_TOLERANCE { 30 } else { 0 };
        Some(Self {
            hour: whole as u32,
            minute,
        })
    }

    /// Local wall-clock instant on `date` in `tz`, converted to UTC.
    ///
    /// `24:00` lands on the next midnight. Times skipped by a DST jump move
    /// forward one hour; repeated times take the earlier instant.
    pub fn on_date(self, date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
        let naive = date.and_time(NaiveTime::MIN)
            + Duration::minutes(i64::from(self.hour * 60 + self.minute));
        tz.from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
            .map(|local| local.with_timezone(&Utc))
    }
}

fn build_event(
    record: &Value,
    group_key: &str,
    date: NaiveDate,
    tz: Tz,
) -> Result<DayScheduleEvent, MalformedRecord> {
    let raw: RawInterval = serde_json::from_value(record.clone())
        .map_err(|_| MalformedRecord::NotAnObject(record.to_string()))?;
    let start = raw.start.ok_or(MalformedRecord::MissingField("start"))?;
    let end = raw.end.ok_or(MalformedRecord::MissingField("end"))?;

    let anchor = |value: &Value| {
        let hour = HourValue::from_json(value)?;
        hour.on_date(date, tz)
            .ok_or_else(|| MalformedRecord::InvalidHour(value.to_string()))
    };

    let start = anchor(&start)?;
    let end = anchor(&end)?;
    if end <= start {
        return Err(MalformedRecord::EmptyInterval(record.to_string()));
    }

    Ok(DayScheduleEvent {
        start,
        end,
        kind: raw.kind.as_deref().map(EventType::from).unwrap_or_default(),
        group_key: GroupKey::parse(group_key),
    })
}

/// Converts every well-formed record of `day` into an absolute event.
pub fn build_day_events(day: &DaySchedule, date: NaiveDate, tz: Tz) -> Vec<DayScheduleEvent> {
    let mut events = Vec::new();
    for (group_key, records) in &day.groups {
        let Some(records) = records.as_array() else {
            debug!("[DAY {}] Skipping group {}: records are not a list", date, group_key);
            continue;
        };
        for record in records {
            match build_event(record, group_key, date, tz) {
                Ok(event) => events.push(event),
                Err(e) => debug!("[DAY {}] Skipping record of group {}: {}", date, group_key, e),
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Kyiv;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn hour(value: Value) -> HourValue {
        HourValue::from_json(&value).unwrap()
    }

    #[test]
    fn test_hour_values() {
        assert_eq!(hour(json!(13.5)), HourValue { hour: 13, minute: 30 });
        assert_eq!(hour(json!("9,5")), HourValue { hour: 9, minute: 30 });
        assert_eq!(hour(json!("9.5")), HourValue { hour: 9, minute: 30 });
        assert_eq!(hour(json!(8)), HourValue { hour: 8, minute: 0 });
        assert_eq!(hour(json!(8.25)), HourValue { hour: 8, minute: 0 });
        assert_eq!(hour(json!(24)), HourValue { hour: 24, minute: 0 });
    }

    #[test]
    fn test_invalid_hour_values() {
        for value in [json!("soon"), json!(-1), json!(25), json!(null), json!([1])] {
            assert!(matches!(
                HourValue::from_json(&value),
                Err(MalformedRecord::InvalidHour(_))
            ));
        }
    }

    #[test]
    fn test_local_time_is_converted_to_utc() {
        // Kyiv is UTC+3 until the last Sunday of October.
        let start = hour(json!(13.5)).on_date(date(), Kyiv).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-10-19T10:30:00+00:00");

        let winter = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let start = hour(json!(8)).on_date(winter, Kyiv).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-12-01T06:00:00+00:00");
    }

    #[test]
    fn test_end_of_day_rolls_to_next_midnight() {
        let end = hour(json!(24)).on_date(date(), Kyiv).unwrap();
        assert_eq!(end.to_rfc3339(), "2026-10-19T21:00:00+00:00");
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 2026-03-29 03:00 local does not exist in Kyiv.
        let spring = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let start = hour(json!(3)).on_date(spring, Kyiv).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-03-29T01:00:00+00:00");
    }

    #[test]
    fn test_build_day_events() {
        let day: DaySchedule = serde_json::from_value(json!({
            "groups": {
                "1.1": [
                    {"start": 8, "end": 11.5, "type": "DEFINITE_OUTAGE"},
                    {"start": "18,5", "end": 20}
                ],
                "2...3": [
                    {"start": 0, "end": 2}
                ]
            }
        }))
        .unwrap();

        let events = build_day_events(&day, date(), Kyiv);
        assert_eq!(events.len(), 3);

        assert_eq!(events[0].group_key, GroupKey::Exact("1.1".to_owned()));
        assert_eq!(events[0].start.to_rfc3339(), "2026-10-19T05:00:00+00:00");
        assert_eq!(events[0].end.to_rfc3339(), "2026-10-19T08:30:00+00:00");
        assert_eq!(events[0].kind, EventType::Other("DEFINITE_OUTAGE".to_owned()));

        assert_eq!(events[1].start.to_rfc3339(), "2026-10-19T15:30:00+00:00");
        assert_eq!(events[1].kind, EventType::Outage);

        assert_eq!(events[2].group_key, GroupKey::Range { low: 2, high: 3 });
        assert_eq!(events[2].start.to_rfc3339(), "2026-10-18T21:00:00+00:00");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let day: DaySchedule = serde_json::from_value(json!({
            "groups": {
                "4.1": [
                    {"start": 8},
                    {"end": 9},
                    {"start": "later", "end": 10},
                    "08:00-10:00",
                    {"start": 12, "end": 14}
                ]
            }
        }))
        .unwrap();

        let events = build_day_events(&day, date(), Kyiv);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start.to_rfc3339(), "2026-10-19T09:00:00+00:00");
    }

    #[test]
    fn test_reversed_and_empty_intervals_are_skipped() {
        let day: DaySchedule = serde_json::from_value(json!({
            "groups": {
                "4.1": [
                    {"start": 20, "end": 18},
                    {"start": 9.5, "end": "9,5"},
                    {"start": 21, "end": 22}
                ],
                "4.2": {"start": 1, "end": 2}
            }
        }))
        .unwrap();

        let events = build_day_events(&day, date(), Kyiv);
        assert_eq!(events.len(), 1);
        assert!(events[0].start < events[0].end);
        assert_eq!(events[0].start.to_rfc3339(), "2026-10-19T18:00:00+00:00");

        let err = build_event(&json!({"start": 20, "end": 18}), "4.1", date(), Kyiv).unwrap_err();
        assert!(matches!(err, MalformedRecord::EmptyInterval(_)));
    }

    #[test]
    fn test_events_follow_document_order_of_groups() {
        let day: DaySchedule = serde_json::from_value(json!({
            "groups": {
                "4.1": [{"start": 9, "end": 10}],
                "3...5": [{"start": 9, "end": 12}]
            }
        }))
        .unwrap();

        let keys: Vec<String> = build_day_events(&day, date(), Kyiv)
            .iter()
            .map(|e| e.group_key.to_string())
            .collect();
        assert_eq!(keys, ["4.1", "3...5"]);
    }

    #[test]
    fn test_missing_end_is_reported() {
        let err = build_event(&json!({"start": 8}), "1.1", date(), Kyiv).unwrap_err();
        assert_eq!(err, MalformedRecord::MissingField("end"));
    }
}
