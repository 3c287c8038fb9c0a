use std::borrow::Borrow;
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle assigned to an owner when it is first registered.
///
/// Usage statistics are keyed by this handle rather than by name so they
/// survive renames. Handles are never reused within one registry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OwnerId(pub u64);

impl OwnerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Owner names are always strings. Other identifier types convert into their
/// string form through the `From` impls below, so lookups never reject a name.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OwnerName(String);

impl OwnerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OwnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OwnerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OwnerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for OwnerName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OwnerName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&String> for OwnerName {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<&OwnerName> for OwnerName {
    fn from(value: &OwnerName) -> Self {
        value.clone()
    }
}

impl From<char> for OwnerName {
    fn from(value: char) -> Self {
        Self(value.to_string())
    }
}

impl From<Uuid> for OwnerName {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

macro_rules! owner_name_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for OwnerName {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

owner_name_from_display!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// A named tenant and its queue of pending items.
///
/// Items keep insertion order and are deduplicated by equality on add.
pub struct Owner<T> {
    id: OwnerId,
    name: OwnerName,
    queue: VecDeque<T>,
}

impl<T> Owner<T> {
    pub(crate) fn new(id: OwnerId, name: OwnerName) -> Self {
        Self {
            id,
            name,
            queue: VecDeque::new(),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn name(&self) -> &OwnerName {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: OwnerName) {
        self.name = name;
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Items in queue order, head first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.queue.iter()
    }

    pub fn peek(&self) -> Option<&T> {
        self.queue.front()
    }

    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Drain every queued item, head first.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.queue.drain(..)
    }
}

impl<T: PartialEq> Owner<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.queue.contains(item)
    }

    /// Append items to the tail, skipping anything already queued. Returns the
    /// number of items actually appended.
    pub fn add<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let before = self.queue.len();
        for item in items {
            if !self.queue.contains(&item) {
                self.queue.push_back(item);
            }
        }
        self.queue.len() - before
    }
}

impl<T: Clone> Owner<T> {
    /// Head of the queue. Removes it when `destroy` is set, otherwise returns a
    /// copy and leaves the queue untouched.
    pub fn next(&mut self, destroy: bool) -> Option<T> {
        if destroy {
            self.queue.pop_front()
        } else {
            self.queue.front().cloned()
        }
    }
}

impl<T> fmt::Debug for Owner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("queued", &self.queue.len())
            .finish()
    }
}
