use std::fmt::{Display, Write};

use crate::{Color, RbTree};

impl<K: Display, V> RbTree<K, V> {
    /// Indented pre-order rendering of the tree shape with color tags,
    /// one line per node:
    ///
    /// ```text
    /// R---{B:30}
    ///     L---{B:10}
    ///     R---{B:40}
    /// ```
    ///
    /// Tests assert this format verbatim; keep it stable.
    pub fn structure(&self) -> String {
        let mut out = String::new();
        if let Some(r) = self.root {
            self.structure_line(r, 0, "R---", &mut out);
        }
        out
    }

    fn structure_line(
        &self,
        i: usize,
        depth: usize,
        tag: &str,
        out: &mut String,
    ) {
        let node = &self.slots[i];
        let color = match node.color {
            Color::Red => 'R',
            Color::Black => 'B',
        };
        for _ in 0..depth {
            out.push_str("    ");
        }
        let _ = writeln!(out, "{tag}{{{color}:{key}}}", key = node.key);
        if let Some(l) = node.left {
            self.structure_line(l, depth + 1, "L---", out);
        }
        if let Some(r) = node.right {
            self.structure_line(r, depth + 1, "R---", out);
        }
    }
}

impl<K: Ord, V> RbTree<K, V> {
    /// Panics unless every red-black and arena invariant holds: black
    /// root, no red-red edge, uniform black height, consistent
    /// parent/child links, no orphan slots, sorted in-order keys.
    pub fn assert_invariants(&self) {
        let r = match self.root {
            Some(r) => r,
            None => {
                assert!(self.slots.is_empty(), "rootless tree with slots");
                return;
            }
        };
        assert_eq!(self.slots[r].parent, None);
        assert_eq!(self.slots[r].color, Color::Black, "root must be black");
        let (count, _) = self.check_subtree(r);
        assert_eq!(count, self.slots.len(), "unreachable slots");

        let mut cur = self.first();
        while let Some(i) = cur {
            let next = self.next_of(i);
            if let Some(j) = next {
                assert!(
                    self.slots[i].key <= self.slots[j].key,
                    "in-order keys out of order"
                );
            }
            cur = next;
        }
    }

    fn check_subtree(&self, i: usize) -> (usize, usize) {
        let node = &self.slots[i];
        if node.color == Color::Red {
            assert_ne!(self.color(node.left), Color::Red, "red-red edge");
            assert_ne!(self.color(node.right), Color::Red, "red-red edge");
        }
        let (lc, lh) = match node.left {
            Some(l) => {
                assert_eq!(self.slots[l].parent, Some(i), "bad parent link");
                self.check_subtree(l)
            }
            None => (0, 0),
        };
        let (rc, rh) = match node.right {
            Some(r) => {
                assert_eq!(self.slots[r].parent, Some(i), "bad parent link");
                self.check_subtree(r)
            }
            None => (0, 0),
        };
        assert_eq!(lh, rh, "black height mismatch");
        (lc + rc + 1, lh + usize::from(node.color == Color::Black))
    }
}
