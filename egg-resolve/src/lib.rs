#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
mod resolver;

pub use error::Error;
pub use resolver::{Mode, install_sequence};
