//! region.rs — Locates one region's daily schedule inside the provider's page document.

use crate::day_events::DaySchedule;
use crate::error::{ScheduleError, ScheduleResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// `template_name` of the page component that carries the outage schedule.
pub const SCHEDULE_TEMPLATE: &str = "electricity-outages-daily-schedule";

#[derive(Debug, Deserialize)]
struct ScheduleComponent {
    #[serde(rename = "dailySchedule", default)]
    daily_schedule: HashMap<String, RegionSchedule>,
}

/// Today's and (once published) tomorrow's schedule for one region.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionSchedule {
    #[serde(default)]
    pub today: Option<DaySchedule>,
    #[serde(default)]
    pub tomorrow: Option<DaySchedule>,
}

/// Pulls `dailySchedule[region_code]` out of the schedule component.
pub fn find_region_schedule(document: &Value, region_code: &str) -> ScheduleResult<RegionSchedule> {
    let component = document
        .get("components")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|c| c.get("template_name").and_then(Value::as_str) == Some(SCHEDULE_TEMPLATE))
        .ok_or_else(|| ScheduleError::SourceFormat("schedule component".into()))?;

    let mut component: ScheduleComponent = serde_json::from_value(component.clone())
        .map_err(|e| ScheduleError::SourceFormat(format!("schedule component: {e}")))?;

    component
        .daily_schedule
        .remove(region_code)
        .ok_or_else(|| ScheduleError::Resolution(format!("region {region_code} in schedule")))
}
