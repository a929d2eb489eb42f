use std::borrow::Borrow;
use std::fmt;
use std::ops::Index;

use rb_tree::RbTree;
pub use rb_tree::{Cursor, IntoPairs, Iter};

/// Ordered key-value map backed by a red-black tree.
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    tree: RbTree<K, V>,
}

impl<K: Ord, V> OrderedMap<K, V> {
    pub fn new() -> Self { Self { tree: RbTree::new() } }

    pub fn len(&self) -> usize { self.tree.len() }
    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn max_size(&self) -> usize { RbTree::<K, V>::max_size() }
    pub fn clear(&mut self) { self.tree.clear() }
    pub fn swap(&mut self, other: &mut Self) { std::mem::swap(self, other) }

    /// Returns whether the pair was inserted; an existing key reports
    /// failure and keeps both its key and its value.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree.insert_unique(key, value).1
    }
    /// Inserts or replaces, handing back the previous value.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.find(&key) {
            Some(i) => {
                Some(std::mem::replace(self.tree.value_mut(i), value))
            }
            None => {
                self.tree.insert_unique(key, value);
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).map(|i| self.tree.value(i))
    }
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let i = self.tree.find(key)?;
        Some(self.tree.value_mut(i))
    }
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).map(|i| self.tree.key_value(i))
    }
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.cursor_at(self.tree.find(key))
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let i = self.tree.find(key)?;
        Some(self.tree.remove_at(i))
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|i| self.tree.key_value(i))
    }
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|i| self.tree.key_value(i))
    }
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let i = self.tree.first()?;
        Some(self.tree.remove_at(i))
    }
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let i = self.tree.last()?;
        Some(self.tree.remove_at(i))
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.tree.cursor_front_mut();
        loop {
            let keep = match cursor.key_value_mut() {
                Some((k, v)) => f(k, v),
                None => break,
            };
            if keep {
                cursor.move_next();
            } else {
                let _ = cursor.remove_current();
            }
        }
    }

    /// Moves every pair whose key is absent from `self` out of `other`;
    /// pairs with a key already present stay behind in `other`.
    pub fn merge(&mut self, other: &mut Self) {
        for (k, v) in std::mem::take(other).tree.into_pairs() {
            if self.contains_key(&k) {
                other.insert(k, v);
            } else {
                self.insert(k, v);
            }
        }
    }

    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.tree.find(&key) {
            Some(at) => Entry::Occupied(OccupiedEntry { at, map: self }),
            None => Entry::Vacant(VacantEntry { key, map: self }),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> { self.tree.iter() }
    pub fn keys(&self) -> Keys<'_, K, V> { Keys(self.iter()) }
    pub fn values(&self) -> Values<'_, K, V> { Values(self.iter()) }
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        self.tree.cursor_front()
    }
    pub fn cursor_back(&self) -> Cursor<'_, K, V> { self.tree.cursor_back() }
    pub fn cursor_end(&self) -> Cursor<'_, K, V> { self.tree.cursor_end() }
}

pub enum Entry<'a, K, V> {
    Vacant(VacantEntry<'a, K, V>),
    Occupied(OccupiedEntry<'a, K, V>),
}

pub struct VacantEntry<'a, K, V> {
    key: K,
    map: &'a mut OrderedMap<K, V>,
}

pub struct OccupiedEntry<'a, K, V> {
    at: usize,
    map: &'a mut OrderedMap<K, V>,
}

impl<'a, K: Ord, V> Entry<'a, K, V> {
    pub fn key(&self) -> &K {
        match self {
            Self::Vacant(entry) => entry.key(),
            Self::Occupied(entry) => entry.key(),
        }
    }
    pub fn and_modify<F: FnOnce(&mut V)>(self, f: F) -> Entry<'a, K, V> {
        match self {
            Self::Occupied(mut entry) => {
                f(entry.get_mut());
                Self::Occupied(entry)
            }
            Self::Vacant(entry) => Self::Vacant(entry),
        }
    }
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Self::Occupied(entry) => entry.into_mut(),
            Self::Vacant(entry) => entry.insert(default),
        }
    }
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Self::Occupied(entry) => entry.into_mut(),
            Self::Vacant(entry) => entry.insert(default()),
        }
    }
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(
        self,
        default: F,
    ) -> &'a mut V {
        match self {
            Self::Occupied(entry) => entry.into_mut(),
            Self::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
        }
    }
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        match self {
            Self::Occupied(entry) => entry.into_mut(),
            Self::Vacant(entry) => entry.insert(Default::default()),
        }
    }
}

impl<'a, K: Ord, V> VacantEntry<'a, K, V> {
    pub fn key(&self) -> &K { &self.key }
    pub fn into_key(self) -> K { self.key }
    pub fn insert(self, value: V) -> &'a mut V {
        let (i, _) = self.map.tree.insert_unique(self.key, value);
        self.map.tree.value_mut(i)
    }
}

impl<'a, K: Ord, V> OccupiedEntry<'a, K, V> {
    pub fn key(&self) -> &K { self.map.tree.key(self.at) }
    pub fn get(&self) -> &V { self.map.tree.value(self.at) }
    pub fn get_mut(&mut self) -> &mut V { self.map.tree.value_mut(self.at) }
    pub fn into_mut(self) -> &'a mut V { self.map.tree.value_mut(self.at) }
    pub fn insert(&mut self, value: V) -> V {
        std::mem::replace(self.get_mut(), value)
    }
    pub fn remove(self) -> V { self.remove_entry().1 }
    pub fn remove_entry(self) -> (K, V) { self.map.tree.remove_at(self.at) }
}

pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<&'a K> { self.0.next().map(|(k, _)| k) }
}
impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<&'a V> { self.0.next().map(|(_, v)| v) }
}
impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, Q, V> Index<&Q> for OrderedMap<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V> Default for OrderedMap<K, V> {
    fn default() -> Self { Self::new() }
}

impl<K: Ord, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoPairs<K, V>;
    fn into_iter(self) -> IntoPairs<K, V> { self.tree.into_pairs() }
}
impl<'a, K: Ord, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert_or_assign(k, v);
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
impl<K: Ord, V: Eq> Eq for OrderedMap<K, V> {}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use sorted_assoc::SortedAssoc;

    use crate::{Entry, OrderedMap};

    #[test]
    fn sanity_check() {
        let mut map = OrderedMap::new();
        assert!(map.is_empty());

        assert!(map.insert(2, "two"));
        assert!(map.insert(1, "one"));
        assert!(map.insert(3, "three"));
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&9), None);
        assert_eq!(map.get_key_value(&1), Some((&1, &"one")));
        assert!(map.keys().eq([&1, &2, &3]));
        assert!(map.values().eq([&"one", &"two", &"three"]));

        *map.get_mut(&1).unwrap() = "uno";
        assert_eq!(map[&1], "uno");

        assert_eq!(map.remove(&2), Some("two"));
        assert_eq!(map.remove(&2), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn duplicate_insert_reports_failure() {
        let mut map = OrderedMap::new();
        assert!(map.insert(1, 1));
        assert!(!map.insert(1, 3));
        assert_eq!(map[&1], 1);
        assert_eq!(map.len(), 1);

        assert_eq!(map.insert_or_assign(1, 3), Some(1));
        assert_eq!(map[&1], 3);
        assert_eq!(map.insert_or_assign(2, 20), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    #[should_panic = "no entry found for key"]
    fn index_panics_on_absent_key() {
        let map: OrderedMap<i32, i32> = OrderedMap::new();
        let _ = map[&7];
    }

    #[test]
    fn entry_api() {
        let mut map = OrderedMap::new();

        assert_eq!(map.entry(0).key(), &0);
        map.entry(0).or_insert("zero");
        assert_eq!(map[&0], "zero");
        map.entry(0).or_insert("xxx");
        assert_eq!(map[&0], "zero");

        map.entry(2).or_insert_with_key(|_| "two");
        assert_eq!(map.get(&2), Some(&"two"));

        map.entry(2).and_modify(|v| *v = "second");
        assert_eq!(map[&2], "second");
        map.entry(9).and_modify(|v| *v = "missed");
        assert!(!map.contains_key(&9));

        if let Entry::Occupied(entry) = map.entry(2) {
            assert_eq!(entry.get(), &"second");
            assert_eq!(entry.remove(), "second");
        }
        assert!(!map.contains_key(&2));

        map.entry(1).or_default();
        assert!(map[&1].is_empty());
    }

    #[test]
    fn merge_keeps_duplicate_keys_in_source() {
        let mut lhs: OrderedMap<_, _> =
            [(1, 'a'), (2, 'b')].into_iter().collect();
        let mut rhs: OrderedMap<_, _> =
            [(2, 'x'), (3, 'c')].into_iter().collect();
        lhs.merge(&mut rhs);
        assert!(lhs.iter().eq([(&1, &'a'), (&2, &'b'), (&3, &'c')]));
        assert!(rhs.iter().eq([(&2, &'x')]));
    }

    #[test]
    fn boundary_pairs() {
        let mut map: OrderedMap<_, _> =
            [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        assert_eq!(map.first_key_value(), Some((&1, &'a')));
        assert_eq!(map.last_key_value(), Some((&3, &'c')));
        assert_eq!(map.pop_first(), Some((1, 'a')));
        assert_eq!(map.pop_last(), Some((3, 'c')));
        assert_eq!(map.pop_last(), Some((2, 'b')));
        assert_eq!(map.pop_last(), None);
    }

    #[test]
    fn retain_by_key_and_value() {
        let mut map: OrderedMap<_, _> =
            (0..10).map(|k| (k, k * k)).collect();
        map.retain(|k, v| {
            *v += 1;
            k % 3 == 0
        });
        assert!(map.iter().eq([(&0, &1), (&3, &10), (&6, &37), (&9, &82)]));
    }

    #[test]
    fn find_cursor() {
        let map: OrderedMap<_, _> =
            [(1, 'a'), (2, 'b')].into_iter().collect();
        assert_eq!(map.find(&2).key_value(), Some((&2, &'b')));
        assert!(map.find(&9).is_end());
        assert_eq!(map.find(&9), map.cursor_end());
    }

    #[test]
    fn random_ops_match_naive() {
        let mut rng = ChaCha20Rng::from_seed([0; 32]);
        let mut map = OrderedMap::new();
        let mut naive = SortedAssoc::new();
        for step in 0..1000_u32 {
            let key: u8 = rng.gen_range(0..50);
            if rng.gen_bool(0.6) {
                assert_eq!(
                    map.insert(key, step),
                    naive.insert_unique(key, step)
                );
            } else {
                assert_eq!(
                    map.remove(&key),
                    naive.remove(&key).map(|(_, v)| v)
                );
            }
            assert_eq!(map.get(&key), naive.get(&key));
            assert_eq!(map.len(), naive.len());
        }
        assert!(map.iter().eq(naive.pairs()));
    }
}
