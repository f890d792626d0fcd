use std::collections::HashMap;

use crate::{Error, Result};

/// Entities that can live in an [`IndexedContainer`].
pub trait Identified {
    fn id(&self) -> &str;
}

/// Ordered storage addressable both by position and by string id.
///
/// Read documents get ids derived from their wire index (`"0"`, `"1"`, ...);
/// on write the position is what lands on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedContainer<T> {
    items: Vec<T>,
    ids: HashMap<String, usize>,
}

impl<T> Default for IndexedContainer<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashMap::new(),
        }
    }
}

impl<T: Identified> IndexedContainer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item`, returning its index.
    pub fn push(&mut self, item: T) -> Result<usize> {
        if self.ids.contains_key(item.id()) {
            return Err(Error::DuplicateId {
                id: item.id().to_string(),
            });
        }

        let index = self.items.len();
        self.ids.insert(item.id().to_string(), index);
        self.items.push(item);

        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index_of(id).and_then(|index| self.items.get(index))
    }

    /// Mutable access; the id itself must not be changed through it.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let index = self.index_of(id)?;
        self.items.get_mut(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a IndexedContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
struct Named(&'static str);

#[cfg(test)]
impl Identified for Named {
    fn id(&self) -> &str {
        self.0
    }
}

#[test]
fn lookup_by_id_and_index() -> Result<()> {
    let mut container = IndexedContainer::new();
    assert_eq!(container.push(Named("a"))?, 0);
    assert_eq!(container.push(Named("b"))?, 1);

    assert_eq!(container.index_of("b"), Some(1));
    assert_eq!(container.get("a"), Some(&Named("a")));
    assert_eq!(container.at(1), Some(&Named("b")));
    assert_eq!(container.get("c"), None);
    assert_eq!(container.iter().map(Identified::id).collect::<Vec<_>>(), ["a", "b"]);

    Ok(())
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut container = IndexedContainer::new();
    assert!(container.push(Named("a")).is_ok());
    assert!(matches!(
        container.push(Named("a")),
        Err(Error::DuplicateId { id }) if id == "a"
    ));
    assert_eq!(container.len(), 1);
}
