// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Sibling collections
//!
//! Every level of the model stores its children in a [`MetadataList`]. Names
//! are unique within a list: insertion looks the name up first, so loading the
//! same level twice merges instead of duplicating. Insertion order is kept.

use serde::{Deserialize, Serialize};

/// An entity identified by name within its sibling group
pub trait MetadataItem {
    fn name(&self) -> &str;
}

/// Ordered, name-unique collection of sibling entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataList<T> {
    items: Vec<T>,
}

impl<T> Default for MetadataList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: MetadataItem> MetadataList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Find an entity by exact (case-sensitive) name
    pub fn find(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Append `item` unless a sibling with the same name exists.
    ///
    /// Returns `true` when the item was inserted.
    pub fn insert(&mut self, item: T) -> bool {
        if self.contains(item.name()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Return the sibling named `name`, creating it with `create` if absent.
    ///
    /// The boolean is `true` when a new entity was appended.
    pub fn find_or_insert_with<F>(&mut self, name: &str, create: F) -> (&mut T, bool)
    where
        F: FnOnce() -> T,
    {
        match self.items.iter().position(|item| item.name() == name) {
            Some(index) => (&mut self.items[index], false),
            None => {
                self.items.push(create());
                let last = self.items.len() - 1;
                (&mut self.items[last], true)
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.name() == name)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name()).collect()
    }
}

impl<'a, T> IntoIterator for &'a MetadataList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut MetadataList<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

impl<T: MetadataItem> FromIterator<T> for MetadataList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = MetadataList::new();
        for item in iter {
            list.insert(item);
        }
        list
    }
}
