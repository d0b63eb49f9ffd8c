//! Command-line front end for the opening hours service.

pub mod cli;
pub mod commands;
