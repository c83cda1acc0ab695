//! Command implementations and the interactive front end.

pub mod config;
pub mod generate;
pub mod interactive;
