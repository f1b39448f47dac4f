use crate::groups::GroupKey;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Minute of the local day, `0..=1440`. `24:00` is only meaningful as an exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(24 * 60);

    /// Builds a clock time from minutes since midnight, clamped to the end of the day.
    pub fn from_minutes(minutes: u32) -> Self {
        let clamped = minutes.min(u32::from(Self::END_OF_DAY.0));
        Self(u16::try_from(clamped).unwrap_or(Self::END_OF_DAY.0))
    }

    pub fn hm(hour: u32, minute: u32) -> Self {
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self::hm(time.hour(), time.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A bound usable inside an `Interval`: ordered, copyable and printable for sensors.
pub trait Bound: Copy + Ord + fmt::Debug {
    fn render(&self) -> String;
}

impl Bound for ClockTime {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl Bound for DateTime<Utc> {
    fn render(&self) -> String {
        self.to_rfc3339()
    }
}

/// Half-open outage window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval<T> {
    pub start: T,
    pub end: T,
}

impl<T: Bound> Interval<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: T) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Upstream event kind. Everything that is not `OUTAGE` is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventType {
    #[default]
    Outage,
    Other(String),
}

impl From<&str> for EventType {
    fn from(raw: &str) -> Self {
        match raw {
            "OUTAGE" => EventType::Outage,
            other => EventType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Outage => f.write_str("OUTAGE"),
            EventType::Other(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One schedule record of the region source, anchored to an absolute instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayScheduleEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub group_key: GroupKey,
}

impl DayScheduleEvent {
    pub fn interval(&self) -> Interval<DateTime<Utc>> {
        Interval::new(self.start, self.end)
    }
}

/// Current/next state derived from an interval list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum OutageStatus<T> {
    #[serde(rename = "off_now")]
    CurrentlyOff { start: T, end: T },
    #[serde(rename = "upcoming_off")]
    UpcomingOff { start: T, end: T },
    #[serde(rename = "no_more_today")]
    NoMoreToday,
}

impl<T: Bound> OutageStatus<T> {
    pub fn label(&self) -> &'static str {
        match self {
            OutageStatus::CurrentlyOff { .. } => "off_now",
            OutageStatus::UpcomingOff { .. } => "upcoming_off",
            OutageStatus::NoMoreToday => "no_more_today",
        }
    }

    pub fn bounds(&self) -> Option<Interval<T>> {
        match *self {
            OutageStatus::CurrentlyOff { start, end } | OutageStatus::UpcomingOff { start, end } => {
                Some(Interval::new(start, end))
            }
            OutageStatus::NoMoreToday => None,
        }
    }
}

/// The only shape handed to presentation. Rebuilt from scratch on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalPayload<T> {
    pub address: String,
    #[serde(rename = "gpv")]
    pub queue_id: String,
    pub today: Vec<Interval<T>>,
    pub next: OutageStatus<T>,
    pub updated_at: DateTime<Utc>,
}

/// Last payload of a worker, whichever source produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Table(CanonicalPayload<ClockTime>),
    Region(CanonicalPayload<DateTime<Utc>>),
}

macro_rules! on_payload {
    ($snapshot:expr, $p:ident => $body:expr) => {
        match $snapshot {
            Snapshot::Table($p) => $body,
            Snapshot::Region($p) => $body,
        }
    };
}

impl Snapshot {
    pub fn address(&self) -> &str {
        on_payload!(self, p => &p.address)
    }

    pub fn gpv(&self) -> &str {
        on_payload!(self, p => &p.queue_id)
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        on_payload!(self, p => p.updated_at)
    }

    pub fn is_off_now(&self) -> bool {
        self.next_status() == "off_now"
    }

    pub fn next_status(&self) -> &'static str {
        on_payload!(self, p => p.next.label())
    }

    pub fn next_start(&self) -> Option<String> {
        on_payload!(self, p => p.next.bounds().map(|b| b.start.render()))
    }

    pub fn next_end(&self) -> Option<String> {
        on_payload!(self, p => p.next.bounds().map(|b| b.end.render()))
    }

    pub fn today_count(&self) -> usize {
        on_payload!(self, p => p.today.len())
    }

    /// Today's intervals rendered as `(start, end)` pairs.
    pub fn today(&self) -> Vec<(String, String)> {
        on_payload!(self, p => p
            .today
            .iter()
            .map(|i| (i.start.render(), i.end.render()))
            .collect())
    }
}
