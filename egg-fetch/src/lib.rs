#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
mod fetch;

pub use error::Error;
pub use fetch::{Progress, fetch_egg};
