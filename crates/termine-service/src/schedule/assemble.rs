//! Assembly of the display schedule from raw feed events.

use chrono::NaiveDateTime;

use super::clock::WallClock;
use super::describe::describe;
use super::event::{DisplayEvent, RawEvent};
use super::occurrence::OccurrenceSet;
use super::reconcile::reconcile;

/// ## Summary
/// Builds the schedule as seen from `reference`, a wall-clock time in the
/// display zone.
///
/// Single events are kept while their end is not before the reference.
/// Recurring series contribute their next occurrence, skipping dates taken
/// over by overrides. Overrides become rows of their own. The result is
/// sorted by start; ties keep feed order, with series before moved rows.
/// Rows are on the display wall clock.
///
/// Events without DTSTART, cancelled events and series whose rule cannot be
/// expanded are left out.
#[must_use]
#[tracing::instrument(skip_all, fields(events = events.len(), %reference))]
pub fn assemble(
    events: &[RawEvent],
    reference: NaiveDateTime,
    clock: &WallClock,
) -> Vec<DisplayEvent> {
    let reference = clock.anchor_wall(reference);
    let reconciliation = reconcile(events, reference, clock);
    let mut schedule = Vec::new();

    for event in events.iter().filter(|e| !e.is_override()) {
        if event.cancelled {
            tracing::debug!(uid = ?event.uid, "Skipping cancelled event");
            continue;
        }
        let Some(start) = event.start else {
            tracing::debug!(uid = ?event.uid, "Skipping event without DTSTART");
            continue;
        };
        let end = event.end.unwrap_or(start).max(start);
        let rule = event.structured_rule();

        if rule.is_none() && event.rdates.is_empty() {
            if end >= reference {
                schedule.push(event.to_display(clock.wall(start), clock.wall(end), None));
            }
            continue;
        }

        let exceptions = event
            .exdates
            .iter()
            .copied()
            .chain(reconciliation.exclusions_for(event.series_uid()));

        let occurrences = match OccurrenceSet::new(
            start,
            end,
            rule.as_ref(),
            exceptions,
            event.rdates.iter().copied(),
        ) {
            Ok(occurrences) => occurrences,
            Err(err) => {
                tracing::warn!(uid = ?event.uid, error = %err, "Omitting series");
                continue;
            }
        };

        match occurrences.next_after(reference) {
            Some(next) => {
                let description = rule.as_ref().map(describe);
                schedule.push(event.to_display(
                    clock.wall(next.start),
                    clock.wall(next.end),
                    description,
                ));
            }
            None => tracing::debug!(uid = ?event.uid, "Series has no further occurrence"),
        }
    }

    tracing::debug!(moved = reconciliation.moved.len(), "Adding moved occurrences");
    schedule.extend(reconciliation.moved);
    schedule.sort_by_key(|e| e.start);

    tracing::info!(count = schedule.len(), "Assembled schedule");
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::clock::ZonedDateTime;
    use chrono::{NaiveDate, TimeDelta, TimeZone};

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn clock() -> WallClock {
        WallClock::from_tzid("Europe/Berlin").unwrap()
    }

    fn local(d: u32, h: u32, min: u32) -> ZonedDateTime {
        clock().anchor_wall(at(d, h, min))
    }

    fn single(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> RawEvent {
        RawEvent {
            uid: Some(title.to_lowercase()),
            start: Some(clock().anchor_wall(start)),
            end: Some(clock().anchor_wall(end)),
            title: Some(title.to_string()),
            ..RawEvent::default()
        }
    }

    fn weekly(uid: &str) -> RawEvent {
        RawEvent {
            uid: Some(uid.to_string()),
            start: Some(local(5, 19, 0)),
            end: Some(local(5, 21, 0)),
            title: Some("Stammtisch".to_string()),
            rule: Some("FREQ=WEEKLY;BYDAY=MO".to_string()),
            ..RawEvent::default()
        }
    }

    #[test_log::test]
    fn weekly_series_from_wednesday() {
        let schedule = assemble(&[weekly("s")], at(14, 12, 0), &clock());

        assert_eq!(schedule.len(), 1);
        let row = &schedule[0];
        assert_eq!(row.start, at(19, 19, 0));
        assert_eq!(row.end - row.start, TimeDelta::hours(2));
        assert_eq!(row.description.as_deref(), Some("jeden Montag"));
    }

    #[test]
    fn single_event_end_boundary() {
        let event = single("Vortrag", at(10, 18, 0), at(10, 20, 0));

        assert_eq!(assemble(&[event.clone()], at(10, 20, 0), &clock()).len(), 1);
        let later = at(10, 20, 0) + TimeDelta::seconds(1);
        assert!(assemble(&[event], later, &clock()).is_empty());
    }

    #[test]
    fn override_replaces_next_occurrence() {
        let mut moved = weekly("s");
        moved.rule = None;
        moved.recurrence_id = Some(local(19, 19, 0));
        moved.start = Some(local(20, 19, 0));
        moved.end = Some(local(20, 21, 0));

        let schedule = assemble(&[weekly("s"), moved], at(14, 12, 0), &clock());

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].start, at(20, 19, 0));
        assert_eq!(
            schedule[0].description.as_deref(),
            Some("verschoben, sonst jeden Montag")
        );
        assert_eq!(schedule[1].start, at(26, 19, 0));
        assert!(schedule.iter().all(|row| row.start != at(19, 19, 0)));
    }

    #[test]
    fn utc_override_excludes_utc_series_date() {
        let utc = |d: u32, h: u32| rrule::Tz::UTC.from_utc_datetime(&at(d, h, 0));
        let mut series = weekly("s");
        series.start = Some(utc(5, 18));
        series.end = Some(utc(5, 20));

        let mut moved = weekly("s");
        moved.rule = None;
        moved.recurrence_id = Some(utc(19, 18));
        moved.start = Some(utc(20, 18));
        moved.end = Some(utc(20, 20));

        let schedule = assemble(&[series, moved], at(14, 12, 0), &clock());
        let starts: Vec<_> = schedule.iter().map(|row| row.start).collect();
        assert_eq!(starts, vec![at(20, 19, 0), at(26, 19, 0)]);
    }

    #[test]
    fn missing_anchor_and_cancelled_are_skipped() {
        let mut no_start = single("Ohne", at(20, 18, 0), at(20, 19, 0));
        no_start.start = None;
        let mut cancelled = single("Abgesagt", at(20, 18, 0), at(20, 19, 0));
        cancelled.cancelled = true;

        assert!(assemble(&[no_start, cancelled], at(1, 0, 0), &clock()).is_empty());
    }

    #[test_log::test]
    fn unexpandable_rule_omits_series() {
        let mut broken = weekly("s");
        broken.rule = Some("FREQ=WEEKLY;BYDAY=NOPE".to_string());
        let other = single("Vortrag", at(20, 18, 0), at(20, 20, 0));

        let schedule = assemble(&[broken, other], at(1, 0, 0), &clock());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].title, "Vortrag");
    }

    #[test]
    fn exhausted_series_is_omitted() {
        let mut finished = weekly("s");
        finished.rule = Some("FREQ=WEEKLY;COUNT=1".to_string());
        assert!(assemble(&[finished], at(6, 0, 0), &clock()).is_empty());
    }

    #[test]
    fn sorted_by_start_ties_keep_feed_order() {
        let events = vec![
            single("Spaet", at(22, 18, 0), at(22, 19, 0)),
            single("Erster", at(20, 18, 0), at(20, 19, 0)),
            single("Zweiter", at(20, 18, 0), at(20, 19, 0)),
        ];
        let titles: Vec<_> = assemble(&events, at(1, 0, 0), &clock())
            .into_iter()
            .map(|row| row.title)
            .collect();
        assert_eq!(titles, vec!["Erster", "Zweiter", "Spaet"]);
    }

    #[test]
    fn end_before_start_is_clamped() {
        let event = single("Kaputt", at(20, 18, 0), at(20, 17, 0));
        let schedule = assemble(&[event], at(1, 0, 0), &clock());
        assert_eq!(schedule[0].end, schedule[0].start);
    }

    #[test]
    fn additional_dates_without_rule() {
        let mut event = single("Extra", at(5, 18, 0), at(5, 19, 0));
        event.rdates = vec![local(21, 18, 0)];

        let schedule = assemble(&[event], at(10, 0, 0), &clock());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].start, at(21, 18, 0));
        assert_eq!(schedule[0].description, None);
    }
}
