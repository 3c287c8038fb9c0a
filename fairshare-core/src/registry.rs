use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::debug;

use crate::owner::{Owner, OwnerId, OwnerName};

/// Name-addressed collection of owners.
///
/// Reads never grow the registry: [`OwnerRegistry::lookup`] only reports what
/// is already installed, and entries appear solely through the mutating
/// paths ([`OwnerRegistry::get_or_create`], [`OwnerRegistry::rename`]).
/// Owners iterate in registration order.
pub struct OwnerRegistry<T> {
    owners: BTreeMap<OwnerId, Owner<T>>,
    names: HashMap<OwnerName, OwnerId>,
    next_id: u64,
}

impl<T> OwnerRegistry<T> {
    pub fn new() -> Self {
        Self {
            owners: BTreeMap::new(),
            names: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<OwnerId> {
        self.names.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&Owner<T>> {
        self.id_of(name).and_then(|id| self.owners.get(&id))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Owner<T>> {
        let id = self.id_of(name)?;
        self.owners.get_mut(&id)
    }

    pub fn get(&self, id: OwnerId) -> Option<&Owner<T>> {
        self.owners.get(&id)
    }

    pub fn get_mut(&mut self, id: OwnerId) -> Option<&mut Owner<T>> {
        self.owners.get_mut(&id)
    }

    /// Existing owner for `name`, or a freshly installed empty one.
    pub fn get_or_create(&mut self, name: impl Into<OwnerName>) -> &mut Owner<T> {
        let name = name.into();
        let id = match self.names.get(&name) {
            Some(id) => *id,
            None => {
                let id = OwnerId(self.next_id);
                self.next_id += 1;
                debug!(owner = %name, id = id.0, "registering owner");
                self.names.insert(name.clone(), id);
                id
            }
        };
        self.owners
            .entry(id)
            .or_insert_with(|| Owner::new(id, name))
    }

    /// Move the owner registered as `from` to the key `to`.
    ///
    /// The owner keeps its [`OwnerId`] and queue. Renaming an unknown name
    /// installs a fresh owner under `to`. If `to` already belongs to a
    /// different owner, that owner is taken out of the registry and returned.
    pub fn rename(
        &mut self,
        from: impl Into<OwnerName>,
        to: impl Into<OwnerName>,
    ) -> Option<Owner<T>> {
        let from = from.into();
        let to = to.into();
        if from == to {
            self.get_or_create(to);
            return None;
        }

        let displaced = self.remove(to.as_str());
        let id = match self.names.remove(&from) {
            Some(id) => id,
            None => {
                self.get_or_create(to);
                return displaced;
            }
        };

        debug!(from = %from, to = %to, id = id.0, "renaming owner");
        if let Some(owner) = self.owners.get_mut(&id) {
            owner.set_name(to.clone());
        }
        self.names.insert(to, id);
        displaced
    }

    /// Take the owner registered as `name` out of the registry.
    pub fn remove(&mut self, name: &str) -> Option<Owner<T>> {
        let id = self.names.remove(name)?;
        self.owners.remove(&id)
    }

    /// Owners in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Owner<T>> {
        self.owners.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &OwnerName> {
        self.owners.values().map(Owner::name)
    }
}

impl<T> Default for OwnerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OwnerRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerRegistry")
            .field("owner_count", &self.owners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
