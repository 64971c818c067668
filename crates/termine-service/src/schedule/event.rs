//! Event records before and after schedule assembly.

use chrono::NaiveDateTime;

use super::clock::ZonedDateTime;
use super::rule::{StructuredRule, parse_rule};
use crate::wiki::{escape_wiki, extract_link};

/// One VEVENT as extracted from the feed. Instants keep the zone they were
/// written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub uid: Option<String>,
    pub start: Option<ZonedDateTime>,
    pub end: Option<ZonedDateTime>,
    /// DTSTART was a DATE value.
    pub all_day: bool,
    pub title: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Raw RRULE text.
    pub rule: Option<String>,
    /// Set on overrides of a single series occurrence.
    pub recurrence_id: Option<ZonedDateTime>,
    pub exdates: Vec<ZonedDateTime>,
    pub rdates: Vec<ZonedDateTime>,
    /// STATUS:CANCELLED.
    pub cancelled: bool,
}

impl RawEvent {
    /// Returns true if this event overrides an occurrence of a series.
    #[must_use]
    pub const fn is_override(&self) -> bool {
        self.recurrence_id.is_some()
    }

    /// Returns the UID, treating an empty one as absent.
    #[must_use]
    pub fn series_uid(&self) -> Option<&str> {
        self.uid.as_deref().filter(|uid| !uid.is_empty())
    }

    /// Returns the parsed recurrence rule, if any.
    #[must_use]
    pub fn structured_rule(&self) -> Option<StructuredRule> {
        self.rule.as_deref().and_then(parse_rule)
    }

    /// Returns true if the event repeats through a rule or additional dates.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.structured_rule().is_some() || !self.rdates.is_empty()
    }

    /// Builds the display row for one occurrence of this event, given on the
    /// display wall clock.
    ///
    /// Text fields are escaped for table cells; the link is taken from the
    /// unescaped notes. An `end` before `start` is raised to `start`.
    #[must_use]
    pub fn to_display(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: Option<String>,
    ) -> DisplayEvent {
        DisplayEvent {
            title: escape_wiki(self.title.as_deref().unwrap_or_default()),
            start,
            end: end.max(start),
            location: self.location.as_deref().map(escape_wiki),
            description,
            all_day: self.all_day,
            link: self.notes.as_deref().and_then(extract_link),
        }
    }
}

/// One row of the rendered schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: Option<String>,
    /// Recurrence phrase or `verschoben` marker.
    pub description: Option<String>,
    pub all_day: bool,
    /// Link taken from the first line of the event notes.
    pub link: Option<String>,
}
