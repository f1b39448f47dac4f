use crate::types::{Bound, Interval, OutageStatus};

/// Classifies `now` against a sorted, disjoint interval list.
///
/// Inside an interval wins, then the first interval starting after `now`,
/// otherwise nothing is left for the day. The caller supplies `now` in the
/// same clock the intervals are encoded in.
pub fn resolve<T: Bound>(intervals: &[Interval<T>], now: T) -> OutageStatus<T> {
    if let Some(current) = intervals.iter().find(|i| i.contains(now)) {
        return OutageStatus::CurrentlyOff {
            start: current.start,
            end: current.end,
        };
    }
    match intervals.iter().find(|i| i.start > now) {
        Some(next) => OutageStatus::UpcomingOff {
            start: next.start,
            end: next.end,
        },
        None => OutageStatus::NoMoreToday,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::merge_slots;
    use crate::types::ClockTime;
    use chrono::{TimeZone, Utc};

    fn hm(h: u32, m: u32) -> ClockTime {
        ClockTime::hm(h, m)
    }

    fn half_hour() -> Vec<Interval<ClockTime>> {
        vec![Interval::new(hm(10, 0), hm(10, 30))]
    }

    #[test]
    fn test_empty_list_is_no_more_today() {
        assert_eq!(resolve::<ClockTime>(&[], hm(0, 0)), OutageStatus::NoMoreToday);
        assert_eq!(resolve::<ClockTime>(&[], hm(23, 59)), OutageStatus::NoMoreToday);
    }

    #[test]
    fn test_inside_interval_is_currently_off() {
        assert_eq!(
            resolve(&half_hour(), hm(10, 15)),
            OutageStatus::CurrentlyOff { start: hm(10, 0), end: hm(10, 30) }
        );
        assert_eq!(
            resolve(&half_hour(), hm(10, 0)),
            OutageStatus::CurrentlyOff { start: hm(10, 0), end: hm(10, 30) }
        );
    }

    #[test]
    fn test_before_interval_is_upcoming() {
        assert_eq!(
            resolve(&half_hour(), hm(9, 0)),
            OutageStatus::UpcomingOff { start: hm(10, 0), end: hm(10, 30) }
        );
    }

    #[test]
    fn test_after_interval_and_exclusive_end() {
        assert_eq!(resolve(&half_hour(), hm(11, 0)), OutageStatus::NoMoreToday);
        assert_eq!(resolve(&half_hour(), hm(10, 30)), OutageStatus::NoMoreToday);
    }

    #[test]
    fn test_picks_first_later_interval() {
        let intervals = vec![
            Interval::new(hm(6, 0), hm(8, 0)),
            Interval::new(hm(12, 0), hm(14, 0)),
            Interval::new(hm(18, 0), hm(20, 0)),
        ];
        assert_eq!(
            resolve(&intervals, hm(9, 0)),
            OutageStatus::UpcomingOff { start: hm(12, 0), end: hm(14, 0) }
        );
    }

    #[test]
    fn test_merged_run_resolves_to_same_bounds() {
        let mut off = [false; 48];
        off[16..22].fill(true);
        let intervals = merge_slots(&off, 30);
        assert_eq!(
            resolve(&intervals, hm(9, 45)),
            OutageStatus::CurrentlyOff { start: hm(8, 0), end: hm(11, 0) }
        );
    }

    #[test]
    fn test_end_to_end_half_hour_grid() {
        let mut off = [false; 48];
        off[..4].fill(true);
        off[47] = true;
        let intervals = merge_slots(&off, 30);

        assert_eq!(
            resolve(&intervals, hm(1, 0)),
            OutageStatus::CurrentlyOff { start: hm(0, 0), end: hm(2, 0) }
        );
        assert_eq!(
            resolve(&intervals, hm(22, 0)),
            OutageStatus::UpcomingOff { start: hm(23, 30), end: ClockTime::END_OF_DAY }
        );
    }

    #[test]
    fn test_absolute_bounds() {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let intervals = vec![Interval::new(start, end)];
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 7, 0, 0).unwrap();
        assert_eq!(resolve(&intervals, now), OutageStatus::CurrentlyOff { start, end });
    }
}
