//! Anchoring feed times to real instants, and showing instants on the
//! display-zone wall clock.

use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use termine_rfc::ical::core::{TimeBasis, Timestamp};

use crate::error::{ServiceError, ServiceResult};

/// An instant together with the zone its recurrence is computed in.
pub type ZonedDateTime = DateTime<rrule::Tz>;

/// The display zone.
///
/// Feed times keep their own zone so that series expand the way their
/// producer meant them to. Only floating values, DATE values and unknown
/// TZIDs borrow the display zone. Rows are shown with [`WallClock::wall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallClock {
    zone: chrono_tz::Tz,
}

impl WallClock {
    #[must_use]
    pub const fn new(zone: chrono_tz::Tz) -> Self {
        Self { zone }
    }

    /// ## Summary
    /// Creates a wall clock from an IANA zone name.
    ///
    /// ## Errors
    /// Returns `InvalidTimezone` if the name is not a known zone.
    pub fn from_tzid(tzid: &str) -> ServiceResult<Self> {
        resolve(tzid)
            .map(Self::new)
            .ok_or_else(|| ServiceError::InvalidTimezone(tzid.to_string()))
    }

    #[must_use]
    pub const fn zone(&self) -> chrono_tz::Tz {
        self.zone
    }

    /// Returns the current wall-clock time in the display zone.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.zone).naive_local()
    }

    /// ## Summary
    /// Pins a feed DATE-TIME to an instant in its own zone.
    ///
    /// UTC values stay in UTC and TZID values in the named zone. Floating
    /// values and TZIDs that name no known zone are read in the display zone.
    #[must_use]
    pub fn anchor(&self, stamp: &Timestamp) -> ZonedDateTime {
        match &stamp.basis {
            TimeBasis::Utc => rrule::Tz::UTC.from_utc_datetime(&stamp.wall),
            TimeBasis::Floating => self.anchor_wall(stamp.wall),
            TimeBasis::Tzid(tzid) => match resolve(tzid) {
                Some(zone) => resolve_local(stamp.wall, zone.into()),
                None => {
                    tracing::warn!(%tzid, "Unknown TZID, reading value in the display zone");
                    self.anchor_wall(stamp.wall)
                }
            },
        }
    }

    /// Pins a DATE to display-zone midnight.
    #[must_use]
    pub fn anchor_date(&self, date: NaiveDate) -> ZonedDateTime {
        self.anchor_wall(date.and_time(NaiveTime::MIN))
    }

    /// Pins a display-zone wall-clock time to an instant.
    #[must_use]
    pub fn anchor_wall(&self, wall: NaiveDateTime) -> ZonedDateTime {
        resolve_local(wall, self.zone.into())
    }

    /// Returns the display-zone wall clock of an instant.
    #[must_use]
    pub fn wall(&self, instant: ZonedDateTime) -> NaiveDateTime {
        instant.with_timezone(&self.zone).naive_local()
    }
}

/// Resolves a local time in `zone`.
///
/// A time in a DST fold takes its first occurrence. A time in a DST gap is
/// shifted forward by one hour.
pub(crate) fn resolve_local(local: NaiveDateTime, zone: rrule::Tz) -> ZonedDateTime {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let shifted = local + TimeDelta::hours(1);
            zone.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| zone.from_utc_datetime(&shifted))
        }
    }
}

/// Resolves a TZID to a zone, accepting common vendor prefixes.
fn resolve(tzid: &str) -> Option<chrono_tz::Tz> {
    let trimmed = tzid.trim();
    let stripped = trimmed
        .strip_prefix("/mozilla.org/20050126_1/")
        .or_else(|| trimmed.strip_prefix("/mozilla.org/"))
        .or_else(|| trimmed.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(trimmed);
    chrono_tz::Tz::from_str(stripped).ok()
}
