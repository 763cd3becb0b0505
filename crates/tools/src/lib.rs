//! Support code for the `seis` command-line tool.

pub mod config;
pub mod source;
