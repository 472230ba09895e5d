#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
mod error;
mod facade;

pub use egg_index::ProxyConfig;
pub use error::Error;
pub use facade::Facade;
