//! Internal modules for the movie catalog client.
//!
//! This library provides command parsing and the command shell used by the
//! mc_client binary.

pub mod commands;
pub mod shell;
