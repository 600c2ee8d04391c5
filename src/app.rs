//! Application identity
//!
//! The application name is computed once at startup and used as the log
//! namespace, the environment-variable prefix and the configuration-file
//! section key.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Name of the running application
///
/// # Example
///
/// ```
/// use runkit::AppName;
///
/// let app = AppName::from_path("/usr/local/bin/edge-proxy");
/// assert_eq!(app.as_str(), "edge-proxy");
/// assert_eq!(app.env_prefix(), "EDGE_PROXY");
/// assert_eq!(app.env_var("config-file"), "EDGE_PROXY_CONFIG_FILE");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppName(Arc<str>);

impl AppName {
    /// Use `name` verbatim
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Take the base name of a binary path (`argv[0]` style)
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(name)
    }

    /// Name of the running binary, falling back to the crate name
    pub fn current() -> Self {
        std::env::args_os()
            .next()
            .map(Self::from_path)
            .unwrap_or_else(|| Self::new(env!("CARGO_PKG_NAME")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is usable as a log namespace
    pub fn is_named(&self) -> bool {
        !self.0.is_empty() && &*self.0 != "."
    }

    /// Upper-cased prefix for environment variables
    pub fn env_prefix(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '-' | '.' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }

    /// `<PREFIX>_<SUFFIX>` with the suffix upper-cased and hyphens mapped to underscores
    pub fn env_var(&self, suffix: &str) -> String {
        let suffix = suffix.replace('-', "_").to_ascii_uppercase();
        let prefix = self.env_prefix();
        if prefix.is_empty() {
            suffix
        } else {
            format!("{prefix}_{suffix}")
        }
    }

    /// Variable holding the default configuration-file path
    pub fn config_file_env(&self) -> String {
        self.env_var("config-file")
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AppName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_of_binary() {
        assert_eq!(AppName::from_path("/opt/bin/indexer").as_str(), "indexer");
        assert_eq!(AppName::from_path("indexer").as_str(), "indexer");
    }

    #[test]
    fn test_env_names() {
        let app = AppName::new("blob-store");
        assert_eq!(app.config_file_env(), "BLOB_STORE_CONFIG_FILE");
        assert_eq!(app.env_var("max-retry-count"), "BLOB_STORE_MAX_RETRY_COUNT");
    }

    #[test]
    fn test_current_is_base_name_of_test_binary() {
        let current = AppName::current();
        assert!(current.is_named());
        assert!(!current.as_str().contains(std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn test_unnamed() {
        assert!(!AppName::new("").is_named());
        assert!(!AppName::new(".").is_named());
        assert!(AppName::new("svc").is_named());
        assert_eq!(AppName::new("").env_var("verbose"), "VERBOSE");
    }
}
