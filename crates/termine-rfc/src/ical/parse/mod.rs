//! Reading iCalendar text.
//!
//! `lexer` unfolds lines and splits them into name, parameters and value,
//! `values` reads typed values, and `parser` builds the component tree.

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::parse;
pub use values::{parse_date, parse_datetime};
