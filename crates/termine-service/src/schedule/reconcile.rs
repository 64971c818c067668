//! Reconciliation of moved occurrences against their series.

use std::collections::{BTreeSet, HashMap};

use super::clock::{WallClock, ZonedDateTime};
use super::describe::describe;
use super::event::{DisplayEvent, RawEvent};

const MOVED: &str = "verschoben";

/// Result of matching overrides to their series.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Original instants per series UID that the base series must skip.
    exclusions: HashMap<String, BTreeSet<ZonedDateTime>>,
    /// One row per live override, in feed order.
    pub moved: Vec<DisplayEvent>,
}

impl Reconciliation {
    /// Returns the original instants replaced by overrides of a series.
    pub fn exclusions_for(&self, uid: Option<&str>) -> impl Iterator<Item = ZonedDateTime> + '_ {
        uid.and_then(|uid| self.exclusions.get(uid))
            .into_iter()
            .flatten()
            .copied()
    }
}

/// ## Summary
/// Indexes overrides and series descriptions, then builds the exclusions and
/// the moved rows.
///
/// Overrides ending before `reference` produce no row but still exclude
/// their original instant. Cancelled overrides only exclude. Moved rows are
/// shown on the display wall clock of `clock`.
#[must_use]
#[tracing::instrument(skip_all, fields(%reference))]
pub fn reconcile(
    events: &[RawEvent],
    reference: ZonedDateTime,
    clock: &WallClock,
) -> Reconciliation {
    let overrides: Vec<&RawEvent> = events.iter().filter(|e| e.is_override()).collect();
    let descriptions = series_descriptions(events);

    let mut exclusions: HashMap<String, BTreeSet<ZonedDateTime>> = HashMap::new();
    for event in &overrides {
        if let (Some(uid), Some(original)) = (event.series_uid(), event.recurrence_id) {
            exclusions
                .entry(uid.to_string())
                .or_default()
                .insert(original);
        }
    }

    let mut moved = Vec::new();
    for event in overrides {
        if event.cancelled {
            tracing::debug!(uid = ?event.uid, "Cancelled override only excludes its original date");
            continue;
        }
        let Some(start) = event.start else {
            tracing::debug!(uid = ?event.uid, "Skipping override without DTSTART");
            continue;
        };
        let end = event.end.unwrap_or(start).max(start);
        if end < reference {
            continue;
        }

        let description = match event.series_uid().and_then(|uid| descriptions.get(uid)) {
            Some(Some(base)) => format!("{MOVED}, sonst {base}"),
            _ => {
                if event.series_uid().is_none() {
                    tracing::debug!("Override without UID is shown on its own");
                }
                MOVED.to_string()
            }
        };
        moved.push(event.to_display(clock.wall(start), clock.wall(end), Some(description)));
    }

    Reconciliation { exclusions, moved }
}

/// Maps each recurring base series UID to its description.
///
/// A series repeating only through additional dates has no description.
fn series_descriptions(events: &[RawEvent]) -> HashMap<&str, Option<String>> {
    events
        .iter()
        .filter(|e| !e.is_override() && e.is_recurring())
        .filter_map(|e| {
            let uid = e.series_uid()?;
            Some((uid, e.structured_rule().as_ref().map(describe)))
        })
        .collect()
}
