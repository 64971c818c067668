//! German phrases for recurrence rules.

use super::rule::{Frequency, StructuredRule};

const WEEKDAYS: [(&str, &str); 7] = [
    ("MO", "Montag"),
    ("TU", "Dienstag"),
    ("WE", "Mittwoch"),
    ("TH", "Donnerstag"),
    ("FR", "Freitag"),
    ("SA", "Samstag"),
    ("SU", "Sonntag"),
];

const ORDINALS: [(i32, &str); 5] = [
    (1, "ersten"),
    (2, "zweiten"),
    (3, "dritten"),
    (4, "vierten"),
    (-1, "letzten"),
];

/// ## Summary
/// Describes a rule, e.g. `jeden ersten Montag im Monat`.
///
/// Only frequency, interval, weekdays, month days and set positions are
/// described. Any frequency other than daily, weekly or monthly is
/// `wiederkehrend`.
#[must_use]
pub fn describe(rule: &StructuredRule) -> String {
    let n = rule.interval;
    match rule.frequency {
        Frequency::Daily if n == 1 => "täglich".to_string(),
        Frequency::Daily => format!("alle {n} Tage"),
        Frequency::Weekly => describe_weekly(rule),
        Frequency::Monthly => describe_monthly(rule),
        Frequency::Other(_) => "wiederkehrend".to_string(),
    }
}

fn describe_weekly(rule: &StructuredRule) -> String {
    let n = rule.interval;
    let days: Vec<&str> = rule.by_day.iter().map(|code| day_name(code)).collect();

    match (days.as_slice(), n) {
        ([], 1) => "jede Woche".to_string(),
        ([], _) => format!("alle {n} Wochen"),
        ([day], 1) => format!("jeden {day}"),
        (days, 1) => format!("jede Woche am {}", join_days(days)),
        (days, _) => format!("alle {n} Wochen am {}", join_days(days)),
    }
}

fn describe_monthly(rule: &StructuredRule) -> String {
    if let Some((position, code)) = single_positioned_day(rule)
        && let Some(ordinal) = ordinal(position)
    {
        return format!("jeden {ordinal} {} im Monat", day_name(code));
    }

    if let [day] = rule.by_month_day.as_slice() {
        return format!("jeden {day}. im Monat");
    }

    match rule.interval {
        1 => "jeden Monat".to_string(),
        n => format!("alle {n} Monate"),
    }
}

/// Returns the set position and weekday code of a rule that picks exactly
/// one weekday per month.
///
/// Either one BYSETPOS with one BYDAY, or no BYSETPOS and one BYDAY that
/// carries its own ordinal (`1MO`, `-1FR`).
fn single_positioned_day(rule: &StructuredRule) -> Option<(i32, &str)> {
    let [code] = rule.by_day.as_slice() else {
        return None;
    };
    match rule.by_set_pos.as_slice() {
        [position] => Some((*position, code)),
        [] => {
            let prefix = code.get(..code.len().checked_sub(2)?)?;
            let position = prefix.strip_prefix('+').unwrap_or(prefix).parse().ok()?;
            Some((position, code))
        }
        _ => None,
    }
}

fn ordinal(position: i32) -> Option<&'static str> {
    ORDINALS
        .iter()
        .find(|(p, _)| *p == position)
        .map(|(_, name)| *name)
}

/// Looks up the German day name by the last two characters of a code.
/// Unknown codes are returned verbatim.
fn day_name(code: &str) -> &str {
    let key = code
        .len()
        .checked_sub(2)
        .and_then(|start| code.get(start..))
        .unwrap_or(code);
    WEEKDAYS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(key))
        .map_or(code, |(_, name)| *name)
}

/// Joins day names as `A und B` or `A, B und C`.
fn join_days(days: &[&str]) -> String {
    match days {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} und {last}", init.join(", ")),
    }
}
