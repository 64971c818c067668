//! iCalendar (RFC 5545) model and parser for reading calendar feeds.

pub mod error;
pub mod ical;
