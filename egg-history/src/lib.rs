#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod entry;
mod error;
mod log;

pub use entry::HistoryEntry;
pub use error::Error;
pub use log::{HistoryLog, Revision, diff};
