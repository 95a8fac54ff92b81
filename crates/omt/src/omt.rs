use std::cmp::Ordering;
use std::collections::VecDeque;
use std::mem;
use std::ops::{ControlFlow, Range};

use crate::error::Error;
use crate::tree::Tree;

/// An order-maintenance tree: a mutable vector of totally ordered
/// values with O(log n) amortized positional edits and ordered search.
///
/// The container holds its values in one of two layouts and switches
/// between them transparently:
///
/// * **array mode**: a ring buffer. Bulk construction lands here, and
///   reads, end insertions and end deletions keep it here. This makes
///   the common storage-engine pattern (load a sorted node, scan it,
///   append) close to free.
/// * **tree mode**: a weight-balanced search tree whose nodes live in
///   a single arena of id-linked cells. The first interior insertion
///   or deletion converts to this layout for O(log n) edits.
///
/// Ordering is never stored: every keyed operation takes a sign
/// function `h` whose result must be monotonically non-decreasing
/// (`Less`... `Equal`... `Greater`) across the stored sequence, the
/// way a key comparison against sorted data naturally is. A
/// non-monotone `h` gives unspecified results (never memory
/// unsafety).
#[cfg_attr(test, derive(Debug))]
pub struct Omt<T> {
    repr: Repr<T>,
}

#[cfg_attr(test, derive(Debug))]
enum Repr<T> {
    Array(VecDeque<T>),
    Tree(Tree<T>),
}

/// Which side of the sign function's zero run [Omt::find] looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Find the smallest index whose sign is `Greater`.
    Greater,
    /// Find the largest index whose sign is `Less`.
    Less,
}

impl<T> Omt<T> {
    /// Creates an empty container without allocating.
    pub fn new() -> Self {
        Self {
            repr: Repr::Array(VecDeque::new()),
        }
    }

    /// Creates an empty container with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            repr: Repr::Array(VecDeque::with_capacity(capacity)),
        }
    }

    /// Builds a container from presorted values, adopting the caller's
    /// allocation. O(1), versus O(n log n) for inserting one by one.
    pub fn from_sorted_vec(values: Vec<T>) -> Self {
        Self {
            repr: Repr::Array(VecDeque::from(values)),
        }
    }

    /// Builds a container by copying presorted values. O(n).
    pub fn from_sorted_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        Self {
            repr: Repr::Array(values.iter().cloned().collect()),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Array(values) => values.len(),
            Repr::Tree(tree) => tree.len(),
        }
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes occupied by the container and its buffer, excluding
    /// whatever stored values may point at.
    pub fn memory_size(&self) -> usize {
        mem::size_of::<Self>()
            + match &self.repr {
                Repr::Array(values) => values.capacity() * mem::size_of::<T>(),
                Repr::Tree(tree) => tree.heap_size(),
            }
    }

    /// Borrows the value at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        match &self.repr {
            Repr::Array(values) => values.get(index),
            Repr::Tree(tree) => Some(tree.get(index)),
        }
    }

    /// Mutably borrows the value at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        match &mut self.repr {
            Repr::Array(values) => values.get_mut(index),
            Repr::Tree(tree) => Some(tree.get_mut(index)),
        }
    }

    /// Replaces the value at `index`, returning the displaced one.
    pub fn set_at(&mut self, index: usize, value: T) -> Result<T, Error> {
        let len = self.len();
        match self.get_mut(index) {
            Some(slot) => Ok(mem::replace(slot, value)),
            None => Err(Error::IndexOutOfBounds { index, len }),
        }
    }

    /// Inserts `value` so it becomes the element at `index`, shifting
    /// later indices up by one. `index == len()` appends. O(log n)
    /// amortized; O(1) at either end while in array mode.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), Error> {
        let len = self.len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        match &mut self.repr {
            Repr::Array(values) if index == 0 => values.push_front(value),
            Repr::Array(values) if index == values.len() => values.push_back(value),
            Repr::Array(_) => {
                self.convert_to_tree();
                let Repr::Tree(tree) = &mut self.repr else {
                    unreachable!()
                };
                tree.insert_at(index, value);
            }
            Repr::Tree(tree) => tree.insert_at(index, value),
        }
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting later
    /// indices down by one. O(log n) amortized; O(1) at either end
    /// while in array mode.
    pub fn delete_at(&mut self, index: usize) -> Result<T, Error> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        let value = match &mut self.repr {
            Repr::Array(values) if index == 0 => values.pop_front().unwrap(),
            Repr::Array(values) if index == values.len() - 1 => values.pop_back().unwrap(),
            Repr::Array(_) => {
                self.convert_to_tree();
                let Repr::Tree(tree) = &mut self.repr else {
                    unreachable!()
                };
                tree.delete_at(index)
            }
            Repr::Tree(tree) => tree.delete_at(index),
        };
        Ok(value)
    }

    /// Inserts `value` at the position `h` selects, keeping keys
    /// unique: if some stored value compares `Equal`, nothing changes
    /// and [Error::KeyExists] comes back (the offered value is
    /// dropped). Otherwise the insertion index is the leftmost
    /// `Greater` position (or the end) and is returned.
    pub fn insert<H>(&mut self, value: T, h: H) -> Result<usize, Error>
    where
        H: Fn(&T) -> Ordering,
    {
        let index = match self.find_zero(&h) {
            Ok(_) => return Err(Error::KeyExists),
            Err(index) => index,
        };
        self.insert_at(index, value)?;
        Ok(index)
    }

    /// Finds the leftmost value whose sign is `Equal`.
    ///
    /// On a miss the returned `Err` carries the index where such a
    /// value would be inserted: the leftmost `Greater` index, or
    /// `len()` when every sign is `Less`. This is the
    /// [slice::binary_search] contract.
    pub fn find_zero<H>(&self, h: H) -> Result<(usize, &T), usize>
    where
        H: Fn(&T) -> Ordering,
    {
        match &self.repr {
            Repr::Array(values) => {
                let index = values.partition_point(|v| h(v) == Ordering::Less);
                match values.get(index) {
                    Some(value) if h(value) == Ordering::Equal => Ok((index, value)),
                    _ => Err(index),
                }
            }
            Repr::Tree(tree) => tree.find_zero(&h),
        }
    }

    /// Finds the boundary element on the given side of the sign
    /// function's zero run: the leftmost `Greater` value, or the
    /// rightmost `Less` one. `None` when no such element exists.
    ///
    /// With `h` comparing stored values against a key `x`, this is
    /// "first above x" ([Direction::Greater]) and "last below x"
    /// ([Direction::Less]); shifting `h` by one turns those into
    /// first-at-least / last-at-most.
    pub fn find<H>(&self, direction: Direction, h: H) -> Option<(usize, &T)>
    where
        H: Fn(&T) -> Ordering,
    {
        match &self.repr {
            Repr::Array(values) => match direction {
                Direction::Greater => {
                    let index = values.partition_point(|v| h(v) != Ordering::Greater);
                    values.get(index).map(|value| (index, value))
                }
                Direction::Less => {
                    let count = values.partition_point(|v| h(v) == Ordering::Less);
                    let index = count.checked_sub(1)?;
                    values.get(index).map(|value| (index, value))
                }
            },
            Repr::Tree(tree) => match direction {
                Direction::Greater => tree.find_plus(&h),
                Direction::Less => tree.find_minus(&h),
            },
        }
    }

    /// Calls `f` on every value in order. A `Break` stops the walk and
    /// its payload is returned.
    pub fn iterate<B, F>(&self, f: F) -> Option<B>
    where
        F: FnMut(usize, &T) -> ControlFlow<B>,
    {
        self.walk_range(0..self.len(), f)
    }

    /// Calls `f` on the values at `range` in order. Errors when
    /// `range.end` exceeds the length; an inverted range is empty.
    pub fn iterate_on_range<B, F>(&self, range: Range<usize>, f: F) -> Result<Option<B>, Error>
    where
        F: FnMut(usize, &T) -> ControlFlow<B>,
    {
        let len = self.len();
        if range.end > len {
            return Err(Error::IndexOutOfBounds {
                index: range.end,
                len,
            });
        }
        if range.start >= range.end {
            return Ok(None);
        }
        Ok(self.walk_range(range, f))
    }

    /// Calls `f` on every value in order with mutable access, for
    /// transforming stored values in place. The references are only
    /// valid during the call.
    pub fn iterate_ptr<B, F>(&mut self, mut f: F) -> Option<B>
    where
        F: FnMut(usize, &mut T) -> ControlFlow<B>,
    {
        let len = self.len();
        let flow = match &mut self.repr {
            Repr::Array(values) => values
                .iter_mut()
                .enumerate()
                .try_for_each(|(index, value)| f(index, value)),
            Repr::Tree(tree) => tree.walk_mut(0..len, &mut f),
        };
        match flow {
            ControlFlow::Break(out) => Some(out),
            ControlFlow::Continue(()) => None,
        }
    }

    fn walk_range<B, F>(&self, range: Range<usize>, mut f: F) -> Option<B>
    where
        F: FnMut(usize, &T) -> ControlFlow<B>,
    {
        let flow = match &self.repr {
            Repr::Array(values) => values
                .range(range.clone())
                .enumerate()
                .try_for_each(|(offset, value)| f(range.start + offset, value)),
            Repr::Tree(tree) => tree.walk(range, &mut f),
        };
        match flow {
            ControlFlow::Break(out) => Some(out),
            ControlFlow::Continue(()) => None,
        }
    }

    /// Moves the values at `[index, len())` into a new container,
    /// keeping `[0, index)` here. Both containers end in array mode.
    pub fn split_at(&mut self, index: usize) -> Result<Omt<T>, Error> {
        let len = self.len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        self.convert_to_array();
        let Repr::Array(values) = &mut self.repr else {
            unreachable!()
        };
        let suffix = values.split_off(index);
        Ok(Omt {
            repr: Repr::Array(suffix),
        })
    }

    /// Concatenates two containers, consuming both.
    pub fn merge(left: Omt<T>, right: Omt<T>) -> Omt<T> {
        let mut values = left.into_values();
        let mut suffix = right.into_values();
        values.append(&mut suffix);
        Omt {
            repr: Repr::Array(values),
        }
    }

    /// Clones the container, duplicating every element through `f`.
    /// For payloads that own heap data behind a shared handle, `f` is
    /// where the caller decides how deep the copy goes.
    pub fn deep_clone<F>(&self, mut f: F) -> Omt<T>
    where
        F: FnMut(&T) -> T,
    {
        let mut values = VecDeque::with_capacity(self.len());
        self.walk_range(0..self.len(), |_, value| {
            values.push_back(f(value));
            ControlFlow::<()>::Continue(())
        });
        Omt {
            repr: Repr::Array(values),
        }
    }

    /// Drops every stored value in order and leaves the container
    /// empty. The buffer and the layout are kept.
    pub fn clear(&mut self) {
        match &mut self.repr {
            Repr::Array(values) => values.clear(),
            Repr::Tree(tree) => tree.clear(),
        }
    }

    /// Releases every stored value and leaves the container empty.
    ///
    /// Element release is ownership-driven here, so this coincides
    /// with [Omt::clear]; it is kept as its own entry point for
    /// callers that track payload ownership explicitly.
    pub fn free_items(&mut self) {
        self.clear();
    }

    fn into_values(mut self) -> VecDeque<T> {
        self.convert_to_array();
        let Repr::Array(values) = self.repr else {
            unreachable!()
        };
        values
    }

    /// Rebuilds the ring buffer as a perfectly balanced tree by
    /// recursive midpoint selection.
    pub(crate) fn convert_to_tree(&mut self) {
        if matches!(self.repr, Repr::Tree(_)) {
            return;
        }
        let Repr::Array(values) = mem::replace(&mut self.repr, Repr::Array(VecDeque::new()))
        else {
            unreachable!()
        };
        let size = values.len();
        let mut tree = Tree::with_capacity(size);
        let mut values = values.into_iter();
        tree.build_from_sorted(size, &mut values);
        debug_assert!(values.next().is_none());
        self.repr = Repr::Tree(tree);
    }

    /// Flattens the tree in order into a fresh ring buffer.
    pub(crate) fn convert_to_array(&mut self) {
        if matches!(self.repr, Repr::Array(_)) {
            return;
        }
        let Repr::Tree(tree) = mem::replace(&mut self.repr, Repr::Array(VecDeque::new())) else {
            unreachable!()
        };
        self.repr = Repr::Array(tree.into_values());
    }
}

impl<T> Default for Omt<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Omt<T> {
    /// Elements are cloned one level deep: payloads held behind shared
    /// handles keep sharing their referents. The clone is in array
    /// mode regardless of the source layout.
    fn clone(&self) -> Self {
        match &self.repr {
            Repr::Array(values) => Omt {
                repr: Repr::Array(values.clone()),
            },
            Repr::Tree(_) => self.deep_clone(T::clone),
        }
    }
}

#[cfg(test)]
impl<T> Omt<T> {
    pub(crate) fn is_valid(&self) {
        if let Repr::Tree(tree) = &self.repr {
            tree.is_valid();
        }
    }

    pub(crate) fn is_tree(&self) -> bool {
        matches!(self.repr, Repr::Tree(_))
    }
}
