//! groups.rs — Rotation group targets and the provider's exact/range group keys.

use crate::error::ScheduleError;
use crate::types::DayScheduleEvent;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

const RANGE_MARKER: &str = "...";

/// The household's subscribed group, e.g. `4.1` or just `4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTarget {
    pub main: i64,
    pub subgroup: Option<String>,
}

impl GroupTarget {
    /// Parses `"main.subgroup"`. An empty subgroup (`"4."`) counts as absent and
    /// anything after a second dot is ignored (`"4.1.2"` is `4.1`).
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        let raw = raw.trim();
        let mut parts = raw.split('.');
        let main = parts.next().unwrap_or_default();
        let subgroup = parts.next().map(str::trim).filter(|s| !s.is_empty());
        let main = main
            .trim()
            .parse::<i64>()
            .map_err(|_| ScheduleError::Resolution(format!("group '{raw}'")))?;
        Ok(Self {
            main,
            subgroup: subgroup.map(str::to_owned),
        })
    }
}

impl fmt::Display for GroupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subgroup {
            Some(sub) => write!(f, "{}.{}", self.main, sub),
            None => write!(f, "{}", self.main),
        }
    }
}

/// Key of a group's interval list in the regional schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// `"4.1"`, `"4"`; matched by string or by main group.
    Exact(String),
    /// `"1...3"`: every subgroup of main groups 1 through 3.
    Range { low: i64, high: i64 },
    /// A range marker whose bounds are not integers. Never matches.
    Malformed(String),
}

impl GroupKey {
    pub fn parse(raw: &str) -> Self {
        let Some((low, high)) = raw.split_once(RANGE_MARKER) else {
            return GroupKey::Exact(raw.to_owned());
        };
        match (low.trim().parse::<i64>(), high.trim().parse::<i64>()) {
            (Ok(low), Ok(high)) => GroupKey::Range { low, high },
            _ => GroupKey::Malformed(raw.to_owned()),
        }
    }

    pub fn matches(&self, target: &GroupTarget) -> bool {
        match self {
            GroupKey::Range { low, high } => (*low..=*high).contains(&target.main),
            GroupKey::Exact(key) => match &target.subgroup {
                Some(sub) => *key == format!("{}.{}", target.main, sub),
                None => match key.split('.').next().map(|m| m.trim().parse::<i64>()) {
                    Some(Ok(main)) => main == target.main,
                    _ => {
                        debug!("[GROUPS] Skipping key '{}': main group is not a number", key);
                        false
                    }
                },
            },
            GroupKey::Malformed(raw) => {
                debug!("[GROUPS] Skipping malformed range key '{}'", raw);
                false
            }
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Exact(raw) | GroupKey::Malformed(raw) => f.write_str(raw),
            GroupKey::Range { low, high } => write!(f, "{low}{RANGE_MARKER}{high}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Keeps the events whose group key applies to `target`, in input order.
pub fn filter_events(events: Vec<DayScheduleEvent>, target: &GroupTarget) -> Vec<DayScheduleEvent> {
    events
        .into_iter()
        .filter(|event| event.group_key.matches(target))
        .collect()
}
