//! gator: a command-line RSS aggregator.
//!
//! Users register and log in locally, add and follow feeds, and run `agg` to
//! poll the least recently fetched feed on a fixed interval, storing new
//! posts in SQLite. `browse` lists the most recent posts.

pub mod aggregator;
pub mod commands;
pub mod config;
pub mod feed;
pub mod state;
pub mod storage;
pub mod util;
