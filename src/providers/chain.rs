//! Provider chain resolution.
//!
//! Configuration lists providers by name with a priority. Resolution is a
//! pure function of that list and the set of registered implementations:
//! disabled entries are dropped, the rest are stable-sorted by priority,
//! and each name is joined to its implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Priority value that turns a provider off.
pub const DISABLED_PRIORITY: i32 = -1;

/// Anything that can be looked up by name in a registry.
pub trait Named {
    fn name(&self) -> &str;
}

/// A configured provider entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Must match a registered provider's name exactly
    pub name: String,
    /// Lower runs earlier; [`DISABLED_PRIORITY`] disables
    pub priority: i32,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.priority == DISABLED_PRIORITY
    }
}

/// Registered provider implementations, keyed by name.
pub struct ProviderRegistry<P: ?Sized> {
    providers: HashMap<String, Arc<P>>,
}

impl<P: ?Sized + Named> ProviderRegistry<P> {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Add a provider. A later registration with the same name wins.
    pub fn register(&mut self, provider: Arc<P>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<P>> {
        self.providers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<P: ?Sized + Named> Default for ProviderRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + Named> FromIterator<Arc<P>> for ProviderRegistry<P> {
    fn from_iter<I: IntoIterator<Item = Arc<P>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for provider in iter {
            registry.register(provider);
        }
        registry
    }
}

/// Ordered providers to try, earliest first. May be empty.
pub fn resolve_chain<P: ?Sized + Named>(
    descriptors: &[ProviderDescriptor],
    registry: &ProviderRegistry<P>,
) -> Vec<Arc<P>> {
    let mut active: Vec<&ProviderDescriptor> =
        descriptors.iter().filter(|d| !d.is_disabled()).collect();
    // sort_by_key is stable: equal priorities keep configuration order
    active.sort_by_key(|d| d.priority);

    active
        .into_iter()
        .filter_map(|descriptor| match registry.get(&descriptor.name) {
            Some(provider) => Some(Arc::clone(provider)),
            None => {
                tracing::debug!(
                    target: "providers",
                    name = %descriptor.name,
                    "Configured provider is not installed, ignoring"
                );
                None
            }
        })
        .collect()
}
