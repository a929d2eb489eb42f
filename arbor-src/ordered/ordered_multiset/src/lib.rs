use std::borrow::Borrow;
use std::fmt;

use rb_tree::RbTree;
pub use rb_tree::Cursor;

/// Ordered multiset: equal elements are kept as repeated entries, in
/// insertion order among themselves.
#[derive(Clone)]
pub struct OrderedMultiset<T> {
    tree: RbTree<T, ()>,
}

impl<T: Ord> OrderedMultiset<T> {
    pub fn new() -> Self { Self { tree: RbTree::new() } }

    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn max_size(&self) -> usize { RbTree::<T, ()>::max_size() }
    pub fn clear(&mut self) { self.tree.clear() }
    pub fn swap(&mut self, other: &mut Self) { std::mem::swap(self, other) }

    pub fn insert(&mut self, elt: T) {
        self.tree.insert_dup(elt, ());
    }

    pub fn contains<Q>(&self, elt: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(elt).is_some()
    }
    pub fn count<Q>(&self, elt: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.equal_range(elt).count()
    }
    pub fn find<Q>(&self, elt: &Q) -> Cursor<'_, T, ()>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.cursor_at(self.tree.find(elt))
    }
    pub fn lower_bound<Q>(&self, elt: &Q) -> Cursor<'_, T, ()>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.cursor_at(self.tree.lower_bound(elt))
    }
    pub fn upper_bound<Q>(&self, elt: &Q) -> Cursor<'_, T, ()>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.cursor_at(self.tree.upper_bound(elt))
    }
    pub fn equal_range<Q>(&self, elt: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Iter(self.tree.equal_range(elt))
    }

    /// Removes one occurrence of `elt`.
    pub fn remove_one<Q>(&mut self, elt: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.tree.find(elt) {
            Some(i) => {
                self.tree.remove_at(i);
                true
            }
            None => false,
        }
    }
    /// Removes every occurrence of `elt` and reports how many there were.
    pub fn remove_all<Q>(&mut self, elt: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut n = 0;
        while self.remove_one(elt) {
            n += 1;
        }
        n
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first().map(|i| self.tree.key(i))
    }
    pub fn last(&self) -> Option<&T> {
        self.tree.last().map(|i| self.tree.key(i))
    }
    pub fn pop_first(&mut self) -> Option<T> {
        let i = self.tree.first()?;
        Some(self.tree.remove_at(i).0)
    }
    pub fn pop_last(&mut self) -> Option<T> {
        let i = self.tree.last()?;
        Some(self.tree.remove_at(i).0)
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.tree.cursor_front_mut();
        loop {
            let keep = match cursor.key_value() {
                Some((elt, _)) => f(elt),
                None => break,
            };
            if keep {
                cursor.move_next();
            } else {
                let _ = cursor.remove_current();
            }
        }
    }

    /// Drains every element of `other` into `self`.
    pub fn merge(&mut self, other: &mut Self) {
        for (elt, _) in std::mem::take(other).tree.into_pairs() {
            self.insert(elt);
        }
    }

    pub fn iter(&self) -> Iter<'_, T> { Iter(self.tree.iter()) }
    pub fn cursor_front(&self) -> Cursor<'_, T, ()> {
        self.tree.cursor_front()
    }
    pub fn cursor_back(&self) -> Cursor<'_, T, ()> { self.tree.cursor_back() }
    pub fn cursor_end(&self) -> Cursor<'_, T, ()> { self.tree.cursor_end() }
}

pub struct Iter<'a, T>(rb_tree::Iter<'a, T, ()>);

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<&'a T> { self.0.next().map(|(k, _)| k) }
}
impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}
impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

pub struct IntoIter<T>(rb_tree::IntoPairs<T, ()>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> { self.0.next().map(|(k, _)| k) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}
impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.0.next_back().map(|(k, _)| k)
    }
}
impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T: Ord> Default for OrderedMultiset<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Ord> IntoIterator for OrderedMultiset<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    fn into_iter(self) -> IntoIter<T> { IntoIter(self.tree.into_pairs()) }
}
impl<'a, T: Ord> IntoIterator for &'a OrderedMultiset<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Iter<'a, T> { self.iter() }
}

impl<T: Ord> FromIterator<T> for OrderedMultiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mset = Self::new();
        mset.extend(iter);
        mset
    }
}
impl<T: Ord> Extend<T> for OrderedMultiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elt in iter {
            self.insert(elt);
        }
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for OrderedMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> PartialEq for OrderedMultiset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
impl<T: Ord> Eq for OrderedMultiset<T> {}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use sorted_assoc::SortedAssoc;

    use crate::OrderedMultiset;

    #[test]
    fn sanity_check() {
        let mut mset = OrderedMultiset::new();
        mset.insert(2);
        mset.insert(1);
        mset.insert(2);
        assert_eq!(mset.len(), 3);
        assert!(mset.iter().eq([&1, &2, &2]));

        assert!(mset.remove_one(&2));
        assert_eq!(mset.count(&2), 1);
        assert!(!mset.remove_one(&5));
        assert_eq!(mset.len(), 2);
    }

    #[test]
    fn counts_and_ranges() {
        let mset: OrderedMultiset<i32> =
            [1, 2, 3, 4, 5, 1, 2, 3].into_iter().collect();
        assert_eq!(mset.len(), 8);
        assert_eq!(mset.count(&1), 2);
        assert_eq!(mset.count(&6), 0);

        let mut range = mset.equal_range(&1);
        assert_eq!(range.next(), Some(&1));
        assert_eq!(range.next_back(), Some(&1));
        assert_eq!(range.next(), None);
        assert_eq!(mset.equal_range(&6).count(), 0);

        assert_eq!(mset.lower_bound(&1).key(), Some(&1));
        assert_eq!(mset.upper_bound(&1).key(), Some(&2));
        assert_eq!(mset.lower_bound(&6), mset.cursor_end());
        assert!(mset.upper_bound(&5).is_end());
    }

    #[test]
    fn remove_all_occurrences() {
        let mut mset: OrderedMultiset<_> =
            [7, 7, 7, 3, 9].into_iter().collect();
        assert_eq!(mset.remove_all(&7), 3);
        assert_eq!(mset.remove_all(&7), 0);
        assert!(mset.iter().eq([&3, &9]));
    }

    #[test]
    fn merge_moves_everything() {
        let mut lhs: OrderedMultiset<_> = [1, 2].into_iter().collect();
        let mut rhs: OrderedMultiset<_> = [2, 3].into_iter().collect();
        lhs.merge(&mut rhs);
        assert!(lhs.iter().eq([&1, &2, &2, &3]));
        assert!(rhs.is_empty());
    }

    #[test]
    fn random_ops_match_naive() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        let mut mset = OrderedMultiset::new();
        let mut naive = SortedAssoc::new();
        for _ in 0..1000 {
            let x: u8 = rng.gen_range(0..30);
            if rng.gen_bool(0.6) {
                mset.insert(x);
                naive.insert_dup(x, ());
            } else {
                assert_eq!(mset.remove_one(&x), naive.remove(&x).is_some());
            }
            assert_eq!(mset.len(), naive.len());
            assert_eq!(mset.count(&x), naive.count(&x));
        }
        assert!(mset.iter().eq(naive.keys()));
    }
}
