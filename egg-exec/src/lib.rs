#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
mod executor;

pub use error::Error;
pub use executor::{Action, ProgressSink, execute};
