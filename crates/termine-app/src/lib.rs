pub mod cli;
pub mod error;
pub mod feed;
pub mod publish;
pub mod run;
