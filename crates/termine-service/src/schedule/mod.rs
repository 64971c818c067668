//! Recurrence resolution and schedule assembly.
//!
//! Feed instants keep the zone they were written in, and series expand in
//! the zone of their start. Display rows are wall-clock times in the zone
//! chosen by [`WallClock`]. The reference instant is always a parameter.

pub mod assemble;
pub mod clock;
pub mod describe;
pub mod event;
pub mod occurrence;
pub mod reconcile;
pub mod rule;

pub use assemble::assemble;
pub use clock::{WallClock, ZonedDateTime};
pub use describe::describe;
pub use event::{DisplayEvent, RawEvent};
pub use occurrence::{Occurrence, OccurrenceSet};
pub use rule::{Frequency, StructuredRule, parse_rule};
