use std::borrow::Borrow;
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;
use std::mem;

mod cursor;
mod debug;

pub use cursor::{Cursor, CursorMut, IntoPairs, Iter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
}

/// Red-black tree whose nodes live in an index arena. Links are indices
/// into `slots`; the arena stays dense, so `slots.len()` is the element
/// count. Removal backfills the vacated slot with the last one.
#[derive(Clone)]
pub struct RbTree<K, V> {
    slots: Vec<Node<K, V>>,
    root: Option<usize>,
}

impl<K, V> RbTree<K, V> {
    pub fn new() -> Self { Self { slots: vec![], root: None } }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }
    pub fn clear(&mut self) {
        self.slots.clear();
        self.root = None;
    }
    pub fn max_size() -> usize {
        isize::MAX as usize / mem::size_of::<Node<K, V>>()
    }

    pub fn key(&self, i: usize) -> &K { &self.slots[i].key }
    pub fn value(&self, i: usize) -> &V { &self.slots[i].value }
    pub fn value_mut(&mut self, i: usize) -> &mut V {
        &mut self.slots[i].value
    }
    pub fn key_value(&self, i: usize) -> (&K, &V) {
        let node = &self.slots[i];
        (&node.key, &node.value)
    }

    fn color(&self, i: Option<usize>) -> Color {
        i.map_or(Color::Black, |i| self.slots[i].color)
    }
    fn parent(&self, i: usize) -> Option<usize> { self.slots[i].parent }
    fn left(&self, i: usize) -> Option<usize> { self.slots[i].left }
    fn right(&self, i: usize) -> Option<usize> { self.slots[i].right }

    fn min_of(&self, mut i: usize) -> usize {
        while let Some(l) = self.left(i) {
            i = l;
        }
        i
    }
    fn max_of(&self, mut i: usize) -> usize {
        while let Some(r) = self.right(i) {
            i = r;
        }
        i
    }

    pub fn first(&self) -> Option<usize> {
        self.root.map(|r| self.min_of(r))
    }
    pub fn last(&self) -> Option<usize> { self.root.map(|r| self.max_of(r)) }

    pub fn next_of(&self, i: usize) -> Option<usize> {
        if let Some(r) = self.right(i) {
            return Some(self.min_of(r));
        }
        let mut cur = i;
        while let Some(p) = self.parent(cur) {
            if self.left(p) == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }
    pub fn prev_of(&self, i: usize) -> Option<usize> {
        if let Some(l) = self.left(i) {
            return Some(self.max_of(l));
        }
        let mut cur = i;
        while let Some(p) = self.parent(cur) {
            if self.right(p) == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_in(self.root, key)
    }
    fn find_in<Q>(&self, i: Option<usize>, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let i = i?;
        match key.cmp(self.slots[i].key.borrow()) {
            Less => self.find_in(self.left(i), key),
            Equal => Some(i),
            Greater => self.find_in(self.right(i), key),
        }
    }

    /// First node whose key is not less than `key`; `None` means "end".
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut cur = self.root;
        while let Some(i) = cur {
            if self.slots[i].key.borrow() < key {
                cur = self.right(i);
            } else {
                best = Some(i);
                cur = self.left(i);
            }
        }
        best
    }
    /// First node whose key is greater than `key`; `None` means "end".
    pub fn upper_bound<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = None;
        let mut cur = self.root;
        while let Some(i) = cur {
            if key < self.slots[i].key.borrow() {
                best = Some(i);
                cur = self.left(i);
            } else {
                cur = self.right(i);
            }
        }
        best
    }
}

impl<K: Ord, V> RbTree<K, V> {
    /// Inserts rejecting an equal key. Returns the node holding `key`
    /// and whether a node was created; an existing key keeps its value.
    pub fn insert_unique(&mut self, key: K, value: V) -> (usize, bool) {
        let r = match self.root {
            Some(r) => r,
            None => return (self.insert_root(key, value), true),
        };
        match self.slot_unique(r, &key) {
            Ok((p, side)) => (self.attach(p, side, key, value), true),
            Err(i) => (i, false),
        }
    }

    /// Inserts unconditionally; equal keys land after the ones already
    /// present in iteration order.
    pub fn insert_dup(&mut self, key: K, value: V) -> usize {
        let r = match self.root {
            Some(r) => r,
            None => return self.insert_root(key, value),
        };
        let (p, side) = self.slot_for(r, &key);
        self.attach(p, side, key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let i = self.find(key)?;
        Some(self.remove_at(i))
    }

    fn slot_unique(&self, i: usize, key: &K) -> Result<(usize, Side), usize> {
        match key.cmp(&self.slots[i].key) {
            Less => match self.left(i) {
                Some(l) => self.slot_unique(l, key),
                None => Ok((i, Side::Left)),
            },
            Equal => Err(i),
            Greater => match self.right(i) {
                Some(r) => self.slot_unique(r, key),
                None => Ok((i, Side::Right)),
            },
        }
    }
    fn slot_for(&self, i: usize, key: &K) -> (usize, Side) {
        if *key < self.slots[i].key {
            match self.left(i) {
                Some(l) => self.slot_for(l, key),
                None => (i, Side::Left),
            }
        } else {
            match self.right(i) {
                Some(r) => self.slot_for(r, key),
                None => (i, Side::Right),
            }
        }
    }

    fn insert_root(&mut self, key: K, value: V) -> usize {
        debug_assert!(self.slots.is_empty());
        self.slots.push(Node {
            key,
            value,
            color: Color::Black,
            parent: None,
            left: None,
            right: None,
        });
        self.root = Some(0);
        0
    }

    fn attach(&mut self, parent: usize, side: Side, key: K, value: V) -> usize {
        let i = self.slots.len();
        self.slots.push(Node {
            key,
            value,
            color: Color::Red,
            parent: Some(parent),
            left: None,
            right: None,
        });
        match side {
            Side::Left => self.slots[parent].left = Some(i),
            Side::Right => self.slots[parent].right = Some(i),
        }
        self.fix_insert(i);
        i
    }

    fn fix_insert(&mut self, mut x: usize) {
        while let Some(p) = self.parent(x) {
            if self.slots[p].color == Color::Black {
                break;
            }
            // a red parent is never the root, so the grandparent exists
            let g = self.parent(p).unwrap();
            let p_is_left = self.left(g) == Some(p);
            let uncle = if p_is_left { self.right(g) } else { self.left(g) };
            if self.color(uncle) == Color::Red {
                let u = uncle.unwrap();
                self.slots[p].color = Color::Black;
                self.slots[u].color = Color::Black;
                self.slots[g].color = Color::Red;
                x = g;
                continue;
            }
            let top = if p_is_left {
                let p = if self.right(p) == Some(x) {
                    self.rotate_left(p);
                    x
                } else {
                    p
                };
                self.rotate_right(g);
                p
            } else {
                let p = if self.left(p) == Some(x) {
                    self.rotate_right(p);
                    x
                } else {
                    p
                };
                self.rotate_left(g);
                p
            };
            self.slots[top].color = Color::Black;
            self.slots[g].color = Color::Red;
            break;
        }
        let r = self.root.unwrap();
        self.slots[r].color = Color::Black;
    }
}

impl<K, V> RbTree<K, V> {
    /// Removes the node at `i` and returns its pair. The value of other
    /// indices is invalidated: removal may relocate one slot.
    pub fn remove_at(&mut self, i: usize) -> (K, V) {
        self.remove_at_tracked(i).0
    }

    // Also reports the (from, to) slot relocation caused by backfilling
    // the arena, so cursors can keep their position.
    pub(crate) fn remove_at_tracked(
        &mut self,
        i: usize,
    ) -> ((K, V), Option<(usize, usize)>) {
        let mut i = i;
        if self.left(i).is_some() && self.right(i).is_some() {
            // swap the doomed pair into the in-order predecessor, which
            // has at most one child
            let p = self.max_of(self.left(i).unwrap());
            self.swap_kv(i, p);
            i = p;
        }
        match (self.left(i), self.right(i)) {
            (Some(c), None) | (None, Some(c)) => {
                // the only child of a black node is a red leaf: splice
                // its pair up and drop the child, black heights intact
                debug_assert_eq!(self.slots[c].color, Color::Red);
                self.swap_kv(i, c);
                self.detach_leaf(c);
                self.free(c)
            }
            (None, None) => {
                if self.slots[i].color == Color::Black
                    && self.root != Some(i)
                {
                    self.fix_double_black(i);
                }
                self.detach_leaf(i);
                self.free(i)
            }
            (Some(_), Some(_)) => unreachable!(),
        }
    }

    // x is black, not the root, and its paths are one black node short.
    fn fix_double_black(&mut self, mut x: usize) {
        while let Some(p) = self.parent(x) {
            let x_is_left = self.left(p) == Some(x);
            // a double-black node has a sibling, or black heights could
            // not have matched before the removal
            let sibling = if x_is_left { self.right(p) } else { self.left(p) };
            let s = sibling.unwrap();
            if self.slots[s].color == Color::Red {
                // red sibling: the parent is black; rotate so the next
                // round sees a black sibling under a red parent
                self.slots[s].color = Color::Black;
                self.slots[p].color = Color::Red;
                if x_is_left {
                    self.rotate_left(p);
                } else {
                    self.rotate_right(p);
                }
                continue;
            }
            let near = if x_is_left { self.left(s) } else { self.right(s) };
            let far = if x_is_left { self.right(s) } else { self.left(s) };
            if self.color(far) == Color::Red {
                // far nephew red: one rotation restores the black height
                let f = far.unwrap();
                self.slots[s].color = self.slots[p].color;
                self.slots[p].color = Color::Black;
                self.slots[f].color = Color::Black;
                if x_is_left {
                    self.rotate_left(p);
                } else {
                    self.rotate_right(p);
                }
                return;
            }
            if self.color(near) == Color::Red {
                // near nephew red: rotate it into the sibling position,
                // turning this into the far-nephew case
                let n = near.unwrap();
                self.slots[n].color = Color::Black;
                self.slots[s].color = Color::Red;
                if x_is_left {
                    self.rotate_right(s);
                } else {
                    self.rotate_left(s);
                }
                continue;
            }
            // both nephews black: recolor, absorb at a red parent or
            // push the missing black up (never past the root)
            self.slots[s].color = Color::Red;
            if self.slots[p].color == Color::Red {
                self.slots[p].color = Color::Black;
                return;
            }
            x = p;
        }
    }

    fn detach_leaf(&mut self, i: usize) {
        debug_assert!(self.left(i).is_none() && self.right(i).is_none());
        match self.parent(i) {
            None => self.root = None,
            Some(p) => {
                if self.left(p) == Some(i) {
                    self.slots[p].left = None;
                } else {
                    self.slots[p].right = None;
                }
            }
        }
    }

    // Frees a detached slot; the last slot backfills the hole.
    fn free(&mut self, i: usize) -> ((K, V), Option<(usize, usize)>) {
        let node = self.slots.swap_remove(i);
        let moved = self.slots.len();
        let relocation = if i < self.slots.len() {
            if self.root == Some(moved) {
                self.root = Some(i);
            }
            if let Some(p) = self.slots[i].parent {
                if self.slots[p].left == Some(moved) {
                    self.slots[p].left = Some(i);
                } else {
                    self.slots[p].right = Some(i);
                }
            }
            if let Some(l) = self.slots[i].left {
                self.slots[l].parent = Some(i);
            }
            if let Some(r) = self.slots[i].right {
                self.slots[r].parent = Some(i);
            }
            Some((moved, i))
        } else {
            None
        };
        ((node.key, node.value), relocation)
    }

    fn swap_kv(&mut self, i: usize, j: usize) {
        debug_assert_ne!(i, j);
        let (a, b) = if i < j {
            let (lo, hi) = self.slots.split_at_mut(j);
            (&mut lo[i], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(i);
            (&mut hi[0], &mut lo[j])
        };
        mem::swap(&mut a.key, &mut b.key);
        mem::swap(&mut a.value, &mut b.value);
    }

    fn rotate_left(&mut self, i: usize) {
        let r = self.right(i).unwrap();
        let rl = self.left(r);
        self.slots[i].right = rl;
        if let Some(rl) = rl {
            self.slots[rl].parent = Some(i);
        }
        let p = self.parent(i);
        self.slots[r].parent = p;
        match p {
            None => self.root = Some(r),
            Some(p) => {
                if self.left(p) == Some(i) {
                    self.slots[p].left = Some(r);
                } else {
                    self.slots[p].right = Some(r);
                }
            }
        }
        self.slots[r].left = Some(i);
        self.slots[i].parent = Some(r);
    }

    fn rotate_right(&mut self, i: usize) {
        let l = self.left(i).unwrap();
        let lr = self.right(l);
        self.slots[i].left = lr;
        if let Some(lr) = lr {
            self.slots[lr].parent = Some(i);
        }
        let p = self.parent(i);
        self.slots[l].parent = p;
        match p {
            None => self.root = Some(l),
            Some(p) => {
                if self.left(p) == Some(i) {
                    self.slots[p].left = Some(l);
                } else {
                    self.slots[p].right = Some(l);
                }
            }
        }
        self.slots[l].right = Some(i);
        self.slots[i].parent = Some(l);
    }
}

impl<K, V> Default for RbTree<K, V> {
    fn default() -> Self { Self::new() }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RbTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use crate::RbTree;

    #[test]
    fn sanity_check() {
        let mut tree = RbTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.find(&1), None);

        for (k, v) in [(2, 'b'), (1, 'a'), (3, 'c')] {
            let (i, inserted) = tree.insert_unique(k, v);
            assert!(inserted);
            assert_eq!(tree.key_value(i), (&k, &v));
        }
        assert_eq!(tree.len(), 3);
        tree.assert_invariants();

        let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [1, 2, 3]);

        assert_eq!(tree.remove(&2), Some((2, 'b')));
        assert_eq!(tree.find(&2), None);
        assert_eq!(tree.len(), 2);
        tree.assert_invariants();

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.first(), None);
    }

    #[test]
    fn insert_unique_keeps_existing_value() {
        let mut tree = RbTree::new();
        let (i, inserted) = tree.insert_unique(7, "old");
        assert!(inserted);
        let (j, inserted) = tree.insert_unique(7, "new");
        assert!(!inserted);
        assert_eq!(i, j);
        assert_eq!(tree.value(j), &"old");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn duplicate_keys_keep_insertion_order() {
        let mut tree = RbTree::new();
        for (k, v) in [(2, 'a'), (1, 'b'), (2, 'c'), (2, 'd'), (3, 'e')] {
            tree.insert_dup(k, v);
        }
        tree.assert_invariants();
        let got: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, [(1, 'b'), (2, 'a'), (2, 'c'), (2, 'd'), (3, 'e')]);
    }

    #[test]
    fn remove_roundtrip_and_absent_noop() {
        let mut tree = RbTree::new();
        for k in 0..64 {
            tree.insert_unique(k, k * 10);
        }
        for k in (0..64).rev() {
            assert_eq!(tree.remove(&k), Some((k, k * 10)));
            assert_eq!(tree.find(&k), None);
            assert_eq!(tree.remove(&k), None);
            assert_eq!(tree.remove(&k), None);
            assert_eq!(tree.len(), k as usize);
            tree.assert_invariants();
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn bounds() {
        let mut tree = RbTree::new();
        for k in [10, 20, 20, 30] {
            tree.insert_dup(k, ());
        }
        assert_eq!(tree.key(tree.lower_bound(&20).unwrap()), &20);
        assert_eq!(tree.key(tree.upper_bound(&20).unwrap()), &30);
        assert_eq!(tree.key(tree.lower_bound(&0).unwrap()), &10);
        assert_eq!(tree.lower_bound(&31), None);
        assert_eq!(tree.upper_bound(&30), None);

        let dupes: Vec<_> = tree.equal_range(&20).map(|(k, _)| *k).collect();
        assert_eq!(dupes, [20, 20]);
        assert_eq!(tree.equal_range(&15).count(), 0);
    }

    #[test]
    fn min_max_and_neighbors() {
        let mut tree = RbTree::new();
        for k in [5, 1, 9, 3, 7] {
            tree.insert_unique(k, ());
        }
        assert_eq!(tree.key(tree.first().unwrap()), &1);
        assert_eq!(tree.key(tree.last().unwrap()), &9);

        let sorted = [1, 3, 5, 7, 9];
        let mut cur = tree.first();
        for want in sorted {
            let i = cur.unwrap();
            assert_eq!(tree.key(i), &want);
            cur = tree.next_of(i);
        }
        assert_eq!(cur, None);

        let mut cur = tree.last();
        for want in sorted.iter().rev() {
            let i = cur.unwrap();
            assert_eq!(tree.key(i), want);
            cur = tree.prev_of(i);
        }
        assert_eq!(cur, None);
    }

    #[test]
    fn random_ops_match_btreemap() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        let mut tree = RbTree::new();
        let mut oracle = BTreeMap::new();
        for step in 0..2000_i32 {
            let key: u32 = rng.gen_range(0..200);
            if rng.gen_bool(0.6) {
                let (i, inserted) = tree.insert_unique(key, step);
                assert_eq!(inserted, !oracle.contains_key(&key));
                assert_eq!(tree.key(i), &key);
                oracle.entry(key).or_insert(step);
            } else {
                assert_eq!(tree.remove(&key), oracle.remove_entry(&key));
            }
            assert_eq!(tree.len(), oracle.len());
            tree.assert_invariants();
        }
        assert!(tree.iter().eq(oracle.iter()));

        let cloned = tree.clone();
        assert!(cloned.iter().eq(tree.iter()));
    }

    #[test]
    fn into_pairs_is_sorted() {
        let mut tree = RbTree::new();
        let mut rng = ChaCha20Rng::from_seed([1; 32]);
        let mut keys: Vec<u16> = (0..100).collect();
        use rand::seq::SliceRandom;
        keys.shuffle(&mut rng);
        for &k in &keys {
            tree.insert_unique(k, u32::from(k) + 1);
        }
        let pairs: Vec<_> = tree.into_pairs().collect();
        assert_eq!(pairs.len(), 100);
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(pairs.iter().all(|&(k, v)| u32::from(k) + 1 == v));
    }
}
