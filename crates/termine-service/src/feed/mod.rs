//! Turning a calendar feed into [`RawEvent`](crate::schedule::RawEvent)s.

pub mod extract;

pub use extract::{extract, read_events};
