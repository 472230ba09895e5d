//! Proxy configuration for outbound HTTP(S) requests to remote stores.
//!
//! Grounded on `original_source/enstaller/proxy/util.py`'s `get_proxy_info`, with the
//! process-wide opener it installs replaced by an explicit value passed to the HTTP client
//! builder at construction (`spec.md` §9).

use std::env;

/// Proxy settings for a [`crate::RemoteHttpIndexedStore`]'s HTTP client.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProxyConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl ProxyConfig {
    /// Reads `PROXY_HOST`, `PROXY_PORT`, `PROXY_USER`, `PROXY_PASS` from the environment.
    ///
    /// Returns the default (no proxy) if `PROXY_HOST` is unset or empty.
    pub fn from_env() -> Self {
        ProxyConfig::from_values(env::var("PROXY_HOST").ok(), env::var("PROXY_PORT").ok(), env::var("PROXY_USER").ok(), env::var("PROXY_PASS").ok())
    }

    fn from_values(host: Option<String>, port: Option<String>, user: Option<String>, pass: Option<String>) -> Self {
        let host = host.filter(|host| !host.is_empty());
        if host.is_none() {
            return ProxyConfig::default();
        }
        ProxyConfig {
            host,
            port: port.and_then(|port| port.parse().ok()),
            user: user.filter(|user| !user.is_empty()),
            pass: pass.filter(|pass| !pass.is_empty()),
        }
    }

    /// Whether any proxy should be used at all.
    pub fn is_configured(&self) -> bool {
        self.host.is_some()
    }

    /// Builds the `reqwest` proxy this configuration describes, if any.
    ///
    /// Returns `None` both when unconfigured and when the host/port cannot be turned into a valid
    /// proxy URL; an invalid `PROXY_HOST` degrades to "no proxy" rather than a hard failure, since
    /// reaching a remote store directly is still preferable to refusing to start.
    pub(crate) fn to_reqwest_proxy(&self) -> Option<reqwest::Proxy> {
        let host = self.host.as_deref()?;
        let url = match self.port {
            Some(port) => format!("http://{host}:{port}"),
            None => format!("http://{host}"),
        };
        let mut proxy = reqwest::Proxy::all(url).ok()?;
        if let (Some(user), Some(pass)) = (&self.user, &self.pass) {
            proxy = proxy.basic_auth(user, pass);
        }
        Some(proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_host_means_unconfigured() {
        let config = ProxyConfig::from_values(None, Some("3128".to_string()), None, None);
        assert!(!config.is_configured());
        assert!(config.to_reqwest_proxy().is_none());
    }

    #[test]
    fn host_and_port_are_parsed() {
        let config = ProxyConfig::from_values(Some("proxy.example.invalid".to_string()), Some("3128".to_string()), None, None);
        assert_eq!(config.host.as_deref(), Some("proxy.example.invalid"));
        assert_eq!(config.port, Some(3128));
        assert!(config.to_reqwest_proxy().is_some());
    }

    #[test]
    fn blank_user_is_treated_as_absent() {
        let config = ProxyConfig::from_values(Some("proxy.example.invalid".to_string()), None, Some(String::new()), None);
        assert!(config.user.is_none());
    }
}
