//! Parsed iCalendar content.
//!
//! A feed becomes a tree of [`Component`]s. Each [`Property`] carries an
//! interpreted [`Value`] next to the text it was read from.

mod component;
mod property;
mod value;

pub use component::{Component, ICalendar};
pub use property::{Parameter, Property};
pub use value::{TimeBasis, Timestamp, Value};
