//! Named storage shared by the resource managers.
//!
//! Slot 0 is the null id and never holds a resource. Removed slots stay
//! empty so ids are never reused within a session.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;

/// Dense `u32` handle with 0 reserved as null
pub trait ResourceId: Copy + Eq + std::fmt::Debug {
    fn from_index(index: u32) -> Self;
    fn index(self) -> u32;
}

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub u32);

        impl $name {
            pub const NULL: $name = $name(0);

            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl $crate::resource::resource_table::ResourceId for $name {
            fn from_index(index: u32) -> Self {
                $name(index)
            }

            fn index(self) -> u32 {
                self.0
            }
        }
    };
}

pub(crate) use resource_id;

pub(crate) struct ResourceTable<I: ResourceId, T> {
    kind: &'static str,
    slots: Vec<Option<T>>,
    names: FxHashMap<String, I>,
}

impl<I: ResourceId, T> ResourceTable<I, T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: vec![None],
            names: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, name: &str, value: T) -> Result<I> {
        if self.names.contains_key(name) {
            engine_bail!("lumen3d::ResourceManager", "{} '{}' already exists", self.kind, name);
        }

        let id = I::from_index(self.slots.len() as u32);
        self.slots.push(Some(value));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Id the next `insert` hands out
    pub fn next_id(&self) -> I {
        I::from_index(self.slots.len() as u32)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    pub fn id_by_name(&self, name: &str) -> Option<I> {
        self.names.get(name).copied()
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        if id.index() == 0 {
            return None;
        }
        let value = self.slots.get_mut(id.index() as usize)?.take()?;
        self.names.retain(|_, named| *named != id);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
