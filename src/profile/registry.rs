//! Profile registry.
//!
//! # Responsibilities
//! - Map profile names to instances, one instance per name
//! - Resolve a route's profile names in order
//!
//! # Design Decisions
//! - Populated through a builder at startup, then frozen
//! - Immutable after construction (thread-safe without locks)
//! - No removal API

use std::collections::HashMap;
use std::sync::Arc;

use super::{Capability, Profile, ProfileKind};
use crate::error::{GuardError, GuardResult};

/// Collects profiles before the registry is frozen.
#[derive(Debug, Default)]
pub struct ProfileRegistryBuilder {
    profiles: HashMap<String, Profile>,
    order: Vec<String>,
}

impl ProfileRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `capability` under `name`.
    ///
    /// Fails with [`GuardError::DuplicateProfile`] if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        capability: Capability,
    ) -> GuardResult<&mut Self> {
        let name = name.into();
        if self.profiles.contains_key(&name) {
            return Err(GuardError::DuplicateProfile(name));
        }

        tracing::info!(profile = %name, kind = %capability.kind(), "Security profile registered");
        self.profiles
            .insert(name.clone(), Profile::new(name.clone(), capability));
        self.order.push(name);
        Ok(self)
    }

    pub fn build(self) -> ProfileRegistry {
        ProfileRegistry {
            profiles: Arc::new(self.profiles),
            order: Arc::new(self.order),
        }
    }
}

/// Frozen name → profile map.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Arc<HashMap<String, Profile>>,
    order: Arc<Vec<String>>,
}

impl ProfileRegistry {
    pub fn builder() -> ProfileRegistryBuilder {
        ProfileRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Resolve `names` to profiles, preserving order.
    ///
    /// Fails with [`GuardError::ProfileNotFound`] on the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> GuardResult<Vec<Profile>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.profiles
                    .get(name)
                    .cloned()
                    .ok_or_else(|| GuardError::ProfileNotFound(name.to_string()))
            })
            .collect()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Names and kinds, sorted by name.
    pub fn signature(&self) -> Vec<(String, ProfileKind)> {
        let mut sig: Vec<_> = self
            .profiles
            .values()
            .map(|p| (p.name().to_string(), p.kind()))
            .collect();
        sig.sort();
        sig
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
