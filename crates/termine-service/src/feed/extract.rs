//! VEVENT extraction. Instants are anchored in the zone they were written in.

use termine_rfc::ical::core::{Component, ICalendar, Property, Value};
use termine_rfc::ical::parse_bytes;

use crate::error::{ServiceError, ServiceResult};
use crate::schedule::RawEvent;
use crate::schedule::clock::{WallClock, ZonedDateTime, resolve_local};

/// ## Summary
/// Parses feed bytes and extracts their events.
///
/// ## Errors
/// Returns an error if the feed does not parse or an event carries a
/// non-date value in a date property.
pub fn read_events(bytes: &[u8], clock: &WallClock) -> ServiceResult<Vec<RawEvent>> {
    let calendar = parse_bytes(bytes)?;
    extract(&calendar, clock)
}

/// ## Summary
/// Extracts every VEVENT of a calendar, in feed order.
///
/// ## Errors
/// Returns `TypeMismatch` if DTSTART, DTEND, RECURRENCE-ID, EXDATE or RDATE
/// holds something other than a date, date-time or (for RDATE) period, or a
/// date that does not exist.
#[tracing::instrument(skip_all)]
pub fn extract(calendar: &ICalendar, clock: &WallClock) -> ServiceResult<Vec<RawEvent>> {
    let events = calendar
        .events()
        .into_iter()
        .map(|component| extract_event(component, clock))
        .collect::<ServiceResult<Vec<_>>>()?;

    tracing::debug!(count = events.len(), "Extracted events");
    Ok(events)
}

fn extract_event(component: &Component, clock: &WallClock) -> ServiceResult<RawEvent> {
    let dtstart = component.property("DTSTART");
    let start = dtstart.map(|prop| instant(prop, clock)).transpose()?;

    let end = match component.property("DTEND") {
        Some(prop) => Some(instant(prop, clock)?),
        None => start.zip(component.property("DURATION")).and_then(|(start, prop)| {
            let Value::Duration(duration) = &prop.value else {
                return None;
            };
            let local = start.naive_local().checked_add_signed(*duration)?;
            Some(resolve_local(local, start.timezone()))
        }),
    };

    let recurrence_id = component
        .property("RECURRENCE-ID")
        .map(|prop| instant(prop, clock))
        .transpose()?;

    let mut exdates = Vec::new();
    for prop in component.properties_named("EXDATE") {
        exdates.extend(instants(prop, clock)?);
    }
    let mut rdates = Vec::new();
    for prop in component.properties_named("RDATE") {
        rdates.extend(instants(prop, clock)?);
    }

    let rule = component.property("RRULE").map(|prop| match &prop.value {
        Value::Recur(rule) => rule.clone(),
        _ => prop.raw_value.trim().to_string(),
    });

    let cancelled = component
        .property("STATUS")
        .is_some_and(|status| status.text().trim().eq_ignore_ascii_case("CANCELLED"));

    Ok(RawEvent {
        uid: text(component, "UID"),
        start,
        end,
        all_day: dtstart.is_some_and(Property::is_date_valued),
        title: text(component, "SUMMARY"),
        location: text(component, "LOCATION"),
        notes: text(component, "DESCRIPTION"),
        rule,
        recurrence_id,
        exdates,
        rdates,
        cancelled,
    })
}

/// Reads a single-instant property.
fn instant(prop: &Property, clock: &WallClock) -> ServiceResult<ZonedDateTime> {
    match &prop.value {
        Value::DateTime(stamp) => Ok(clock.anchor(stamp)),
        Value::Date(date) => Ok(clock.anchor_date(*date)),
        _ => Err(mismatch(prop)),
    }
}

/// Reads a multi-instant property. Periods contribute their start.
fn instants(prop: &Property, clock: &WallClock) -> ServiceResult<Vec<ZonedDateTime>> {
    match &prop.value {
        Value::DateTime(stamp) => Ok(vec![clock.anchor(stamp)]),
        Value::Date(date) => Ok(vec![clock.anchor_date(*date)]),
        Value::DateTimes(stamps) => Ok(stamps.iter().map(|stamp| clock.anchor(stamp)).collect()),
        Value::Dates(dates) => Ok(dates.iter().map(|date| clock.anchor_date(*date)).collect()),
        Value::PeriodStarts(stamps) if prop.name == "RDATE" => {
            Ok(stamps.iter().map(|stamp| clock.anchor(stamp)).collect())
        }
        _ => Err(mismatch(prop)),
    }
}

fn mismatch(prop: &Property) -> ServiceError {
    tracing::error!(property = %prop.name, value = %prop.raw_value, "Date property holds no usable date");
    ServiceError::TypeMismatch {
        property: prop.name.clone(),
        found: prop.raw_value.clone(),
    }
}

/// Returns a trimmed text property, treating an empty one as absent.
fn text(component: &Component, name: &str) -> Option<String> {
    let value = component.property(name)?.text().trim();
    (!value.is_empty()).then(|| value.to_string())
}
