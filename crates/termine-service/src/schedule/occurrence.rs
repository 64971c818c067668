//! Next-occurrence resolution for a recurring series.

use std::iter;

use chrono::{NaiveTime, TimeDelta, TimeZone};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};
use termine_rfc::ical::core::TimeBasis;
use termine_rfc::ical::parse::{parse_date, parse_datetime};

use super::clock::{ZonedDateTime, resolve_local};
use super::rule::StructuredRule;
use crate::error::{ServiceError, ServiceResult};

/// Rule parts forwarded to the expansion engine as text. UNTIL is passed as
/// an instant instead, and everything else in a rule (vendor extensions,
/// RSCALE, ...) is ignored during expansion.
const EXPANDED_PARTS: [&str; 13] = [
    "FREQ",
    "INTERVAL",
    "COUNT",
    "WKST",
    "BYSETPOS",
    "BYMONTH",
    "BYMONTHDAY",
    "BYYEARDAY",
    "BYWEEKNO",
    "BYDAY",
    "BYHOUR",
    "BYMINUTE",
    "BYSECOND",
];

/// A single resolved occurrence, in the zone of its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: ZonedDateTime,
    pub end: ZonedDateTime,
}

/// Occurrences of a series: the rule stream minus exception instants plus
/// additional instants. Exclusion wins over addition.
///
/// The series expands in the zone of its start, so a local 19:00 stays 19:00
/// across DST changes while a UTC start keeps its UTC time. Exceptions and
/// additions match by instant whatever zone they were written in.
#[derive(Debug, Clone)]
pub struct OccurrenceSet {
    set: RRuleSet,
    /// Wall-clock length in the series zone.
    duration: TimeDelta,
}

impl OccurrenceSet {
    /// ## Summary
    /// Builds the occurrence set of a series starting at `start`.
    ///
    /// Without a rule the set is the start itself plus the additions. An end
    /// before the start is treated as a zero-length event.
    ///
    /// ## Errors
    /// Returns `InvalidRule` if the expansion engine rejects the rule.
    #[tracing::instrument(skip_all, fields(%start, has_rule = rule.is_some()))]
    pub fn new(
        start: ZonedDateTime,
        end: ZonedDateTime,
        rule: Option<&StructuredRule>,
        exceptions: impl IntoIterator<Item = ZonedDateTime>,
        additions: impl IntoIterator<Item = ZonedDateTime>,
    ) -> ServiceResult<Self> {
        let zone = start.timezone();
        let duration = end.with_timezone(&zone).naive_local() - start.naive_local();

        let set = match rule {
            Some(rule) => build_rule_set(rule, start)?.set_rdates(additions.into_iter().collect()),
            None => RRuleSet::new(start).set_rdates(iter::once(start).chain(additions).collect()),
        };

        Ok(Self {
            set: set.set_exdates(exceptions.into_iter().collect()),
            duration: duration.max(TimeDelta::zero()),
        })
    }

    /// ## Summary
    /// Returns the earliest occurrence starting at or after `reference`.
    ///
    /// The end keeps the wall-clock length of the original event. Returns
    /// `None` once the series is exhausted.
    #[must_use]
    pub fn next_after(&self, reference: ZonedDateTime) -> Option<Occurrence> {
        let found = self.set.clone().after(reference).all(1);
        let Some(start) = found.dates.into_iter().next() else {
            if found.limited {
                tracing::warn!(%reference, "Gave up expanding series before the reference");
            }
            return None;
        };

        let zone = self.set.get_dt_start().timezone();
        let start = start.with_timezone(&zone);
        Some(Occurrence {
            start,
            end: resolve_local(start.naive_local() + self.duration, zone),
        })
    }
}

/// Builds the expansion engine's rule set anchored at `start`.
fn build_rule_set(rule: &StructuredRule, start: ZonedDateTime) -> ServiceResult<RRuleSet> {
    let text = expansion_text(rule);
    tracing::trace!(rule = %text, "Expanding rule");

    let invalid = |reason: String| ServiceError::InvalidRule {
        rule: text.clone(),
        reason,
    };

    let mut parsed = text
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| invalid(err.to_string()))?;

    if let Some(value) = rule.component("UNTIL") {
        match until_instant(value, start.timezone()) {
            Some(until) => parsed = parsed.until(until.with_timezone(&Tz::UTC)),
            None => tracing::debug!(%value, "Dropping unparseable UNTIL"),
        }
    }

    parsed.build(start).map_err(|err| invalid(err.to_string()))
}

/// Renders the standard parts of a rule, except UNTIL, as rule text.
///
/// INTERVAL, BYMONTHDAY and BYSETPOS come from the cleaned values.
fn expansion_text(rule: &StructuredRule) -> String {
    let mut parts = vec![format!("FREQ={}", rule.frequency)];

    for (key, value) in &rule.components {
        let key = key.as_str();
        if !EXPANDED_PARTS.contains(&key)
            || matches!(key, "FREQ" | "INTERVAL" | "BYMONTHDAY" | "BYSETPOS")
        {
            continue;
        }
        parts.push(format!("{key}={value}"));
    }

    if rule.interval > 1 {
        parts.push(format!("INTERVAL={}", rule.interval));
    }
    if !rule.by_month_day.is_empty() {
        parts.push(format!("BYMONTHDAY={}", join(&rule.by_month_day)));
    }
    if !rule.by_set_pos.is_empty() {
        parts.push(format!("BYSETPOS={}", join(&rule.by_set_pos)));
    }

    parts.join(";")
}

/// Reads an UNTIL value. A DATE bound covers its whole day in the series
/// zone, as does a floating date-time.
fn until_instant(value: &str, zone: Tz) -> Option<ZonedDateTime> {
    if !value.contains(['T', 't']) {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59)?;
        let date = parse_date(value, 1, 1).ok()?;
        return Some(resolve_local(date.and_time(last_second), zone));
    }

    let stamp = parse_datetime(value, None, 1, 1).ok()?;
    Some(match stamp.basis {
        TimeBasis::Utc => Tz::UTC.from_utc_datetime(&stamp.wall),
        TimeBasis::Floating | TimeBasis::Tzid(_) => resolve_local(stamp.wall, zone),
    })
}

fn join(values: &[i32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::rule::parse_rule;
    use chrono::{NaiveDate, NaiveDateTime};

    fn wall(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn berlin(y: i32, m: u32, d: u32, h: u32, min: u32) -> ZonedDateTime {
        resolve_local(wall(y, m, d, h, min), Tz::Europe__Berlin)
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> ZonedDateTime {
        Tz::UTC.from_utc_datetime(&wall(y, m, d, h, min))
    }

    fn series(raw_rule: &str, exceptions: Vec<ZonedDateTime>) -> OccurrenceSet {
        let rule = parse_rule(raw_rule).unwrap();
        OccurrenceSet::new(
            berlin(2026, 1, 5, 19, 0),
            berlin(2026, 1, 5, 21, 0),
            Some(&rule),
            exceptions,
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn weekly_next_from_midweek() {
        // 2026-01-05 is a Monday, 2026-01-14 a Wednesday
        let set = series("FREQ=WEEKLY;BYDAY=MO", Vec::new());
        let next = set.next_after(berlin(2026, 1, 14, 12, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 19, 19, 0));
        assert_eq!(next.end, berlin(2026, 1, 19, 21, 0));
    }

    #[test]
    fn reference_is_inclusive() {
        let set = series("FREQ=WEEKLY;BYDAY=MO", Vec::new());
        let next = set.next_after(berlin(2026, 1, 12, 19, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 12, 19, 0));

        let next = set.next_after(berlin(2026, 1, 12, 19, 1)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 19, 19, 0));
    }

    #[test]
    fn exceptions_are_skipped() {
        let set = series("FREQ=WEEKLY;BYDAY=MO", vec![berlin(2026, 1, 12, 19, 0)]);
        let next = set.next_after(berlin(2026, 1, 6, 0, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 19, 19, 0));
    }

    #[test]
    fn local_series_keeps_wall_time_across_dst() {
        let set = series("FREQ=WEEKLY;BYDAY=MO", Vec::new());
        let next = set.next_after(berlin(2026, 7, 1, 0, 0)).unwrap();
        assert_eq!(next.start.naive_local(), wall(2026, 7, 6, 19, 0));
        assert_eq!(next.end.naive_local(), wall(2026, 7, 6, 21, 0));
    }

    #[test]
    fn exception_written_in_utc_matches_local_series() {
        // 17:00Z is 19:00 in Berlin summer time
        let set = series("FREQ=WEEKLY;BYDAY=MO", vec![utc(2026, 7, 6, 17, 0)]);
        let next = set.next_after(berlin(2026, 7, 1, 0, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 7, 13, 19, 0));
    }

    #[test]
    fn utc_series_exceptions_hold_in_summer() {
        let rule = parse_rule("FREQ=WEEKLY;BYDAY=MO").unwrap();
        let set = OccurrenceSet::new(
            utc(2026, 1, 5, 18, 0),
            utc(2026, 1, 5, 20, 0),
            Some(&rule),
            vec![utc(2026, 7, 6, 18, 0), utc(2026, 7, 13, 18, 0)],
            Vec::new(),
        )
        .unwrap();

        let before = set.next_after(berlin(2026, 6, 29, 0, 0)).unwrap();
        assert_eq!(before.start, utc(2026, 6, 29, 18, 0));
        assert_eq!(
            before.start.with_timezone(&Tz::Europe__Berlin).naive_local(),
            wall(2026, 6, 29, 20, 0)
        );

        let next = set.next_after(berlin(2026, 7, 1, 0, 0)).unwrap();
        assert_eq!(next.start, utc(2026, 7, 20, 18, 0));
        assert_eq!(next.end, utc(2026, 7, 20, 20, 0));
    }

    #[test]
    fn count_exhausts_series() {
        let set = series("FREQ=WEEKLY;COUNT=2", Vec::new());
        assert!(set.next_after(berlin(2026, 1, 12, 19, 0)).is_some());
        assert!(set.next_after(berlin(2026, 1, 12, 19, 1)).is_none());
    }

    #[test]
    fn until_date_covers_whole_day() {
        let set = series("FREQ=DAILY;UNTIL=20260107", Vec::new());
        let next = set.next_after(berlin(2026, 1, 7, 0, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 7, 19, 0));
        assert!(set.next_after(berlin(2026, 1, 7, 19, 1)).is_none());
    }

    #[test]
    fn until_utc_is_an_instant() {
        // 18:00Z is 19:00 in Berlin, so the occurrence on the 7th is included
        let set = series("FREQ=DAILY;UNTIL=20260107T180000Z", Vec::new());
        assert_eq!(
            set.next_after(berlin(2026, 1, 7, 0, 0)).map(|o| o.start),
            Some(berlin(2026, 1, 7, 19, 0))
        );
        assert!(set.next_after(berlin(2026, 1, 7, 19, 1)).is_none());
    }

    #[test]
    fn monthly_last_friday() {
        let rule = parse_rule("FREQ=MONTHLY;BYDAY=FR;BYSETPOS=-1").unwrap();
        let set = OccurrenceSet::new(
            berlin(2026, 1, 30, 18, 0),
            berlin(2026, 1, 30, 20, 0),
            Some(&rule),
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        let next = set.next_after(berlin(2026, 2, 1, 0, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 2, 27, 18, 0));
    }

    #[test]
    fn additions_merge_with_rule_stream() {
        let rule = parse_rule("FREQ=WEEKLY;BYDAY=MO").unwrap();
        let set = OccurrenceSet::new(
            berlin(2026, 1, 5, 19, 0),
            berlin(2026, 1, 5, 21, 0),
            Some(&rule),
            vec![berlin(2026, 1, 16, 19, 0)],
            vec![berlin(2026, 1, 15, 19, 0), berlin(2026, 1, 16, 19, 0)],
        )
        .unwrap();

        let next = set.next_after(berlin(2026, 1, 13, 0, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 15, 19, 0));
        assert_eq!(next.end, berlin(2026, 1, 15, 21, 0));

        // the excluded addition on the 16th never shows up
        let next = set.next_after(berlin(2026, 1, 15, 19, 1)).unwrap();
        assert_eq!(next.start, berlin(2026, 1, 19, 19, 0));
    }

    #[test]
    fn without_rule_start_and_additions_only() {
        let set = OccurrenceSet::new(
            berlin(2026, 1, 5, 19, 0),
            berlin(2026, 1, 5, 20, 0),
            None,
            vec![berlin(2026, 1, 5, 19, 0)],
            vec![utc(2026, 2, 2, 18, 0)],
        )
        .unwrap();

        let next = set.next_after(berlin(2026, 1, 1, 0, 0)).unwrap();
        assert_eq!(next.start, berlin(2026, 2, 2, 19, 0));
        assert_eq!(next.start.timezone(), Tz::Europe__Berlin);
        assert_eq!(next.end, berlin(2026, 2, 2, 20, 0));
        assert!(set.next_after(berlin(2026, 2, 2, 19, 1)).is_none());
    }

    #[test]
    fn next_after_is_monotonic() {
        let set = series("FREQ=WEEKLY;BYDAY=MO,TH", vec![berlin(2026, 1, 22, 19, 0)]);
        let mut reference = berlin(2026, 1, 1, 0, 0);
        let mut previous = None;
        while reference < berlin(2026, 3, 1, 0, 0) {
            let next = set.next_after(reference).map(|o| o.start);
            if let (Some(prev), Some(cur)) = (previous, next) {
                assert!(cur >= prev, "{cur} < {prev} at {reference}");
            }
            previous = next;
            reference += TimeDelta::hours(7);
        }
    }

    #[test]
    fn unknown_parts_are_not_forwarded() {
        let rule = parse_rule("FREQ=WEEKLY;X-EVOLUTION-ENDDATE=20300101T000000Z;BYDAY=MO").unwrap();
        assert_eq!(expansion_text(&rule), "FREQ=WEEKLY;BYDAY=MO");
    }

    #[test]
    fn cleaned_values_are_forwarded() {
        let rule = parse_rule("FREQ=MONTHLY;INTERVAL=0;BYMONTHDAY=1,x,15;UNTIL=20270101").unwrap();
        assert_eq!(expansion_text(&rule), "FREQ=MONTHLY;BYMONTHDAY=1,15");
    }

    #[test]
    fn rejected_rule_is_invalid() {
        let rule = parse_rule("FREQ=WEEKLY;BYDAY=NOPE").unwrap();
        let err = OccurrenceSet::new(
            berlin(2026, 1, 5, 19, 0),
            berlin(2026, 1, 5, 21, 0),
            Some(&rule),
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRule { .. }));
    }
}
