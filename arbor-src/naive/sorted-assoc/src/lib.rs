pub struct SortedAssoc<K, V> {
    pairs: Vec<(K, V)>,
}

impl<K: Ord, V> SortedAssoc<K, V> {
    pub fn new() -> Self { Self { pairs: vec![] } }

    pub fn len(&self) -> usize { self.pairs.len() }
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    fn lower(&self, key: &K) -> usize {
        self.pairs.partition_point(|(k, _)| k < key)
    }
    fn upper(&self, key: &K) -> usize {
        self.pairs.partition_point(|(k, _)| k <= key)
    }

    pub fn insert_unique(&mut self, key: K, value: V) -> bool {
        let i = self.lower(&key);
        if self.pairs.get(i).map_or(false, |(k, _)| *k == key) {
            return false;
        }
        self.pairs.insert(i, (key, value));
        true
    }
    pub fn insert_dup(&mut self, key: K, value: V) {
        let i = self.upper(&key);
        self.pairs.insert(i, (key, value));
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let i = self.lower(key);
        self.pairs.get(i).filter(|(k, _)| k == key).map(|(_, v)| v)
    }
    pub fn count(&self, key: &K) -> usize { self.upper(key) - self.lower(key) }

    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let i = self.lower(key);
        if self.pairs.get(i).map_or(false, |(k, _)| k == key) {
            Some(self.pairs.remove(i))
        } else {
            None
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&K, &V)> {
        self.pairs.iter().map(|(k, v)| (k, v))
    }
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.pairs.iter().map(|(k, _)| k)
    }
}

impl<K: Ord, V> Default for SortedAssoc<K, V> {
    fn default() -> Self { Self::new() }
}

#[test]
fn sanity_check() {
    let mut assoc = SortedAssoc::new();
    assert!(assoc.insert_unique(2, 'b'));
    assert!(assoc.insert_unique(1, 'a'));
    assert!(!assoc.insert_unique(2, 'x'));
    assert_eq!(assoc.len(), 2);
    assert_eq!(assoc.get(&2), Some(&'b'));
    assert_eq!(assoc.get(&3), None);

    assoc.insert_dup(2, 'c');
    assert_eq!(assoc.count(&2), 2);
    assert!(assoc.keys().eq([&1, &2, &2]));

    assert_eq!(assoc.remove(&2), Some((2, 'b')));
    assert_eq!(assoc.count(&2), 1);
    assert_eq!(assoc.remove(&9), None);
}
