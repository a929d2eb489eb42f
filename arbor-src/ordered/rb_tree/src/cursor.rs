use std::borrow::Borrow;
use std::fmt;
use std::ptr;

use crate::RbTree;

impl<K, V> RbTree<K, V> {
    pub fn iter(&self) -> Iter<'_, K, V> { Iter::new(self) }

    /// In-order iterator over every pair equal to `key`.
    pub fn equal_range<Q>(&self, key: &Q) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let front = self.lower_bound(key);
        let hi = self.upper_bound(key);
        if front == hi {
            return Iter::bounded(self, None, None);
        }
        let back = match hi {
            Some(u) => self.prev_of(u),
            None => self.last(),
        };
        Iter::bounded(self, front, back)
    }

    pub fn cursor_at(&self, at: Option<usize>) -> Cursor<'_, K, V> {
        Cursor { tree: self, at }
    }
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        self.cursor_at(self.first())
    }
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        self.cursor_at(self.last())
    }
    pub fn cursor_end(&self) -> Cursor<'_, K, V> { self.cursor_at(None) }

    pub fn cursor_at_mut(&mut self, at: Option<usize>) -> CursorMut<'_, K, V> {
        CursorMut { tree: self, at }
    }
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V> {
        let at = self.first();
        CursorMut { tree: self, at }
    }

    /// Consumes the tree into its pairs in key order.
    pub fn into_pairs(self) -> IntoPairs<K, V> {
        let mut order = Vec::with_capacity(self.len());
        let mut cur = self.first();
        while let Some(i) = cur {
            order.push(i);
            cur = self.next_of(i);
        }
        let mut slots: Vec<Option<(K, V)>> = self
            .slots
            .into_iter()
            .map(|node| Some((node.key, node.value)))
            .collect();
        let pairs: Vec<_> =
            order.into_iter().map(|i| slots[i].take().unwrap()).collect();
        IntoPairs { pairs: pairs.into_iter() }
    }
}

/// Double-ended in-order iterator borrowing the tree.
pub struct Iter<'a, K, V> {
    tree: &'a RbTree<K, V>,
    front: Option<usize>,
    back: Option<usize>,
    done: bool,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a RbTree<K, V>) -> Self {
        Self::bounded(tree, tree.first(), tree.last())
    }
    fn bounded(
        tree: &'a RbTree<K, V>,
        front: Option<usize>,
        back: Option<usize>,
    ) -> Self {
        let done = front.is_none() || back.is_none();
        Self { tree, front, back, done }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.done {
            return None;
        }
        let i = self.front.unwrap();
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = self.tree.next_of(i);
        }
        Some(self.tree.key_value(i))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let i = self.back.unwrap();
        if self.front == self.back {
            self.done = true;
        } else {
            self.back = self.tree.prev_of(i);
        }
        Some(self.tree.key_value(i))
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            done: self.done,
        }
    }
}

/// Two-state in-order cursor: at a node, or at the end position. From
/// the end, stepping back lands on the maximum and stepping forward
/// wraps to the minimum, so neither direction is ever undefined.
pub struct Cursor<'a, K, V> {
    tree: &'a RbTree<K, V>,
    at: Option<usize>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub fn is_end(&self) -> bool { self.at.is_none() }
    pub fn key(&self) -> Option<&'a K> {
        self.at.map(|i| self.tree.key(i))
    }
    pub fn value(&self) -> Option<&'a V> {
        self.at.map(|i| self.tree.value(i))
    }
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.at.map(|i| self.tree.key_value(i))
    }
    pub fn move_next(&mut self) {
        self.at = match self.at {
            Some(i) => self.tree.next_of(i),
            None => self.tree.first(),
        };
    }
    pub fn move_prev(&mut self) {
        self.at = match self.at {
            Some(i) => self.tree.prev_of(i),
            None => self.tree.last(),
        };
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}
impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self { *self }
}

impl<K: fmt::Debug, V> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "Cursor({key:?})"),
            None => f.write_str("Cursor(end)"),
        }
    }
}

// Position identity: same tree, same node (or both at end).
impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.at == other.at
    }
}
impl<K, V> Eq for Cursor<'_, K, V> {}

/// Like [`Cursor`], plus value mutation and erase-at-position.
pub struct CursorMut<'a, K, V> {
    tree: &'a mut RbTree<K, V>,
    at: Option<usize>,
}

impl<K, V> CursorMut<'_, K, V> {
    pub fn is_end(&self) -> bool { self.at.is_none() }
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.at.map(|i| self.tree.key_value(i))
    }
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        let i = self.at?;
        let node = &mut self.tree.slots[i];
        Some((&node.key, &mut node.value))
    }
    pub fn move_next(&mut self) {
        self.at = match self.at {
            Some(i) => self.tree.next_of(i),
            None => self.tree.first(),
        };
    }
    pub fn move_prev(&mut self) {
        self.at = match self.at {
            Some(i) => self.tree.prev_of(i),
            None => self.tree.last(),
        };
    }

    /// Removes the current pair and repositions on its in-order
    /// successor (the end position when the maximum was removed).
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let i = self.at?;
        // with only a right child the successor pair gets spliced into
        // this very slot; otherwise the successor node is untouched
        let right_only =
            self.tree.left(i).is_none() && self.tree.right(i).is_some();
        let mut succ =
            if right_only { Some(i) } else { self.tree.next_of(i) };
        let (pair, relocation) = self.tree.remove_at_tracked(i);
        if let Some((from, to)) = relocation {
            if succ == Some(from) {
                succ = Some(to);
            }
        }
        self.at = succ;
        Some(pair)
    }
}

/// Owning in-order iterator.
pub struct IntoPairs<K, V> {
    pairs: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoPairs<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> { self.pairs.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.pairs.size_hint() }
}

impl<K, V> DoubleEndedIterator for IntoPairs<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> { self.pairs.next_back() }
}

impl<K, V> ExactSizeIterator for IntoPairs<K, V> {}
