#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod convert;
mod egg;
mod error;
mod joined;
mod parser;
mod proxy;
mod repo_url;
mod store;

pub use error::Error;
pub use joined::JoinedStore;
pub use parser::{IndexSection, Literal, parse_body, parse_index};
pub use proxy::ProxyConfig;
pub use repo_url::stores_from_urls;
pub use store::{Credentials, IndexedStore, LocalIndexedStore, LocalRepo, RemoteHttpIndexedStore};
