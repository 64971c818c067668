//! Wiki markup for the schedule page.

pub mod escape;
pub mod link;
pub mod table;

pub use escape::escape_wiki;
pub use link::{display_name, extract_link};
pub use table::render_table;
