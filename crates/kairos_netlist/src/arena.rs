//! Typed index arenas.
//!
//! Entities are stored flat and addressed by the id types from
//! [`crate::ids`]. Allocation order is the id order, which keeps every
//! traversal of a design deterministic.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// An id that can key an [`Arena`].
pub trait ArenaId: Copy {
    /// Reconstructs an id from its raw index.
    fn from_raw(raw: u32) -> Self;
    /// The raw index of this id.
    fn as_raw(self) -> u32;
}

/// A typed arena: a `Vec` whose indices are strongly typed ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Arena<I, T> {
        Arena {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Stores `item` and returns its id.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// The id the next call to [`Arena::alloc`] will return.
    pub fn next_id(&self) -> I {
        I::from_raw(self.items.len() as u32)
    }

    /// Whether `id` addresses an item in this arena.
    pub fn contains(&self, id: I) -> bool {
        (id.as_raw() as usize) < self.items.len()
    }

    /// Borrows the item with the given id.
    ///
    /// Panics if the id is out of range.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Mutably borrows the item with the given id.
    ///
    /// Panics if the id is out of range.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }

    /// The number of items stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items in allocation order, paired with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates items mutably in allocation order, paired with their ids.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = I> {
        (0..self.items.len()).map(|i| I::from_raw(i as u32))
    }

    /// Iterates items in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Arena::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SignalId;

    #[test]
    fn alloc_assigns_sequential_ids() {
        let mut arena: Arena<SignalId, &str> = Arena::new();
        assert!(arena.is_empty());
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(*arena.get(a), "a");
        assert_eq!(arena[b], "b");
    }

    #[test]
    fn next_id_predicts_alloc() {
        let mut arena: Arena<SignalId, u32> = Arena::new();
        let predicted = arena.next_id();
        let actual = arena.alloc(42);
        assert_eq!(predicted, actual);
        assert!(arena.contains(actual));
        assert!(!arena.contains(arena.next_id()));
    }

    #[test]
    fn iter_pairs_ids_with_items() {
        let mut arena: Arena<SignalId, u32> = Arena::new();
        arena.alloc(10);
        arena.alloc(20);
        let collected: Vec<(u32, u32)> = arena.iter().map(|(id, v)| (id.as_raw(), *v)).collect();
        assert_eq!(collected, vec![(0, 10), (1, 20)]);
    }

    #[test]
    fn serde_round_trip() {
        let mut arena: Arena<SignalId, String> = Arena::new();
        arena.alloc("x".to_string());
        arena.alloc("y".to_string());
        let json = serde_json::to_string(&arena).unwrap();
        let back: Arena<SignalId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[SignalId::from_raw(1)], "y");
    }
}
