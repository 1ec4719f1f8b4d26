//! Pooled list data structure.
//!
//! A unit's register tuples (the operands of `phidef`, `phijmp` and
//! opaque instructions) are appended to one shared `ListPool` and
//! referred to by small `ListRef` handles, so instructions stay cheap
//! to clone and compare.

use std::convert::TryFrom;
use std::default::Default;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut, Range};

#[derive(Clone, Debug)]
pub struct ListPool<T: Clone + Debug> {
    storage: Vec<T>,
}

impl<T: Clone + Debug> Default for ListPool<T> {
    fn default() -> Self {
        ListPool { storage: vec![] }
    }
}

/// A handle to a run of elements in a `ListPool`. The default handle
/// is the empty list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<T>,
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        ListRef {
            start: 0,
            len: 0,
            _marker: PhantomData,
        }
    }
}

impl<T> ListRef<T> {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn range(&self) -> Range<usize> {
        let start = self.start as usize;
        start..start + self.len as usize
    }
}

impl<T: Clone + Debug> ListPool<T> {
    pub fn from_iter<I: Iterator<Item = T>>(&mut self, iter: I) -> ListRef<T> {
        let start = self.storage.len();
        self.storage.extend(iter);
        let len = self.storage.len() - start;
        ListRef {
            start: u32::try_from(start).unwrap(),
            len: u32::try_from(len).unwrap(),
            _marker: PhantomData,
        }
    }

    pub fn from_slice(&mut self, values: &[T]) -> ListRef<T> {
        self.from_iter(values.iter().cloned())
    }

    /// Total number of elements stored across all lists.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// The list behind `list`, or `None` if the handle came from a
    /// different pool and runs past this one's end.
    pub fn get(&self, list: ListRef<T>) -> Option<&[T]> {
        self.storage.get(list.range())
    }
}

impl<T: Clone + Debug> Index<ListRef<T>> for ListPool<T> {
    type Output = [T];
    fn index(&self, list: ListRef<T>) -> &[T] {
        &self.storage[list.range()]
    }
}

impl<T: Clone + Debug> IndexMut<ListRef<T>> for ListPool<T> {
    fn index_mut(&mut self, list: ListRef<T>) -> &mut [T] {
        &mut self.storage[list.range()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lists_do_not_alias() {
        let mut pool: ListPool<u32> = ListPool::default();
        let a = pool.from_slice(&[1, 2, 3]);
        let b = pool.from_slice(&[0, 0]);
        pool[b][1] = 9;
        assert_eq!(&pool[a], &[1, 2, 3]);
        assert_eq!(&pool[b], &[0, 9]);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn foreign_handles_are_detected() {
        let mut big: ListPool<u32> = ListPool::default();
        let small: ListPool<u32> = ListPool::default();
        let list = big.from_slice(&[1, 2]);
        assert_eq!(big.get(list), Some(&[1u32, 2] as &[u32]));
        assert_eq!(small.get(list), None);
        assert_eq!(small.get(ListRef::default()), Some(&[] as &[u32]));
    }
}
