pub mod error;
pub mod feed;
pub mod schedule;
pub mod wiki;
