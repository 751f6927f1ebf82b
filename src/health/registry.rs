use super::checker::Checker;
use super::models::Presence;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("component {0} already registered")]
    AlreadyRegistered(String),
}

/// A registered checker together with its presence requirement.
#[derive(Clone)]
pub struct Component {
    pub name: String,
    pub presence: Presence,
    pub checker: Arc<dyn Checker>,
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}

struct Entry {
    presence: Presence,
    checker: Arc<dyn Checker>,
}

/// Name → checker map behind a single reader/writer lock.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: &str,
        checker: Arc<dyn Checker>,
        presence: Presence,
    ) -> Result<(), RegistryError> {
        let mut entries = self.write();
        if entries.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        entries.insert(name.to_string(), Entry { presence, checker });
        Ok(())
    }

    /// Removing an absent name is a no-op.
    pub fn unregister(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Copies the current set out so checks in flight never hold the lock.
    pub fn snapshot(&self) -> Vec<Component> {
        self.read()
            .iter()
            .map(|(name, entry)| Component {
                name: name.clone(),
                presence: entry.presence,
                checker: entry.checker.clone(),
            })
            .collect()
    }

    pub fn presence(&self, name: &str) -> Option<Presence> {
        self.read().get(name).map(|entry| entry.presence)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A checker never runs under the lock, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
