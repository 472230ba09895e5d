//! Dispatching repository URL strings to the matching [`IndexedStore`] variant.
//!
//! Grounded on `enpkg.py`'s `create_joined_store`: a bare directory path is treated the same as
//! `file://`, `http(s)://` builds a remote store, and the sentinel `local:` names the in-prefix
//! download cache (`spec.md` §6).

use std::path::PathBuf;

use url::Url;

use crate::{
    Error,
    proxy::ProxyConfig,
    store::{Credentials, IndexedStore, LocalIndexedStore, RemoteHttpIndexedStore},
};

/// Builds the [`IndexedStore`] chain for a list of repository URL strings and the primary
/// prefix's local cache directory (used for the `local:` sentinel).
///
/// `proxy` is applied to every `http://`/`https://` store's client; it has no effect on local
/// stores.
///
/// # Errors
///
/// Returns [`Error::UnsupportedUrl`] if a URL uses a scheme other than `file://`, `http://`,
/// `https://`, a bare path, or the `local:` sentinel.
pub fn stores_from_urls(
    urls: &[String],
    primary_cache_dir: &std::path::Path,
    credentials: Option<Credentials>,
    proxy: Option<&ProxyConfig>,
) -> Result<Vec<IndexedStore>, Error> {
    urls.iter()
        .map(|url| store_from_url(url, primary_cache_dir, credentials.clone(), proxy))
        .collect()
}

fn store_from_url(
    url: &str,
    primary_cache_dir: &std::path::Path,
    credentials: Option<Credentials>,
    proxy: Option<&ProxyConfig>,
) -> Result<IndexedStore, Error> {
    if url == "local:" {
        return Ok(IndexedStore::LocalIndexed(LocalIndexedStore::new(primary_cache_dir.to_path_buf())));
    }
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(IndexedStore::LocalIndexed(LocalIndexedStore::new(PathBuf::from(path))));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        let parsed = Url::parse(url).map_err(|_| Error::UnsupportedUrl(url.to_string()))?;
        return Ok(IndexedStore::RemoteHttp(RemoteHttpIndexedStore::new(parsed, credentials, proxy)));
    }
    if !url.contains("://") {
        return Ok(IndexedStore::LocalIndexed(LocalIndexedStore::new(PathBuf::from(url))));
    }
    Err(Error::UnsupportedUrl(url.to_string()))
}
