//! Environment lookup for `$_NAME` references.

use std::collections::HashMap;

/// A source of environment values.
pub trait EnvProvider {
    /// The value of `name`, or `None` when it is not set.
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An environment with nothing set. Every reference uses its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEnv;

impl EnvProvider for EmptyEnv {
    fn get(&self, _name: &str) -> Option<String> {
        None
    }
}

impl EnvProvider for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl<P: EnvProvider + ?Sized> EnvProvider for &P {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}
