//! Feature-flag source consulted for condition names the planner does not
//! resolve itself.
//!
//! Flag names are looked up uppercased (`enable_reviews` → `ENABLE_REVIEWS`).

use std::collections::BTreeMap;

/// A read-only source of named boolean flags.
pub trait FeatureFlags: Send + Sync {
    /// Look up a flag by its uppercased name. `None` when the source has no
    /// opinion.
    fn flag(&self, name: &str) -> Option<bool>;
}

/// A source with no flags at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFlags;

impl FeatureFlags for NoFlags {
    fn flag(&self, _name: &str) -> Option<bool> {
        None
    }
}

/// Flags held in memory, typically built from `[flags]` in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFlags {
    flags: BTreeMap<String, bool>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag. The name is normalized to uppercase.
    #[must_use]
    pub fn with(mut self, name: &str, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn set(&mut self, name: &str, enabled: bool) {
        self.flags.insert(name.to_uppercase(), enabled);
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<'a> FromIterator<(&'a String, &'a bool)> for StaticFlags {
    fn from_iter<I: IntoIterator<Item = (&'a String, &'a bool)>>(iter: I) -> Self {
        let mut flags = Self::new();
        for (name, enabled) in iter {
            flags.set(name, *enabled);
        }
        flags
    }
}

impl FeatureFlags for StaticFlags {
    fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }
}

impl<F: Fn(&str) -> Option<bool> + Send + Sync> FeatureFlags for F {
    fn flag(&self, name: &str) -> Option<bool> {
        self(name)
    }
}
