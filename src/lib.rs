//! Migraine journal kept as plain markdown files, one per headache, with a static dashboard
//! built from them. Entries are recorded through a short interview in the terminal and
//! everything stays on your disk.
//!

pub mod analysis;
pub mod cli;
pub mod config;
pub mod entries;
pub mod site;
pub mod utils;
