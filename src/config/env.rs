//! Environment variable sources

use std::collections::{BTreeMap, HashMap};

/// Read-only view of environment variables
///
/// The resolver reads the process environment by default. An in-memory map
/// can stand in for it when a binary embeds several applications or when
/// tests must not touch global process state.
pub trait EnvSource: Send + Sync {
    /// Value of `key`, or `None` when the variable is unset
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

impl<E: EnvSource + ?Sized> EnvSource for Box<E> {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

impl<E: EnvSource + ?Sized> EnvSource for std::sync::Arc<E> {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
