//! Interpreted property values.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// What the wall-clock part of a [`Timestamp`] is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBasis {
    /// No zone, the same wall-clock time everywhere.
    Floating,
    /// Written with a trailing `Z`.
    Utc,
    /// Local time in the zone named by the TZID parameter, as written.
    Tzid(String),
}

/// A DATE-TIME value as written in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub wall: NaiveDateTime,
    pub basis: TimeBasis,
}

/// Property value after type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Date(NaiveDate),
    DateTime(Timestamp),
    /// EXDATE or RDATE dates.
    Dates(Vec<NaiveDate>),
    /// EXDATE or RDATE date-times.
    DateTimes(Vec<Timestamp>),
    /// RDATE periods, kept as the instants they begin at.
    PeriodStarts(Vec<Timestamp>),
    Duration(TimeDelta),
    /// Rule text as written. Interpreting it is up to the caller.
    Recur(String),
    /// Unescaped TEXT.
    Text(String),
    /// Anything not interpreted, including values that did not parse.
    Raw(String),
}
