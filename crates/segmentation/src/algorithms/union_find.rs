//! Disjoint-set forest over a flat index space.
//!
//! Path compression plus union by size keeps trees shallow. Storage is kept
//! between calls so segmenters can reuse it for images of any size.

use crate::types::Labeling;

/// Union-find over the indices `0..len()`.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl DisjointSet {
    /// Create a forest of `n` singleton sets.
    pub fn new(n: usize) -> Self {
        let mut set = Self::default();
        set.reset(n);
        set
    }

    /// Discard all merges and resize to `n` singletons, reusing storage.
    pub fn reset(&mut self, n: usize) {
        self.parent.clear();
        self.parent.extend(0..n as u32);
        self.size.clear();
        self.size.resize(n, 1);
    }

    /// Number of elements, not sets.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of the set containing `x`.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] as usize != root {
            root = self.parent[root] as usize;
        }
        // Point every node on the path straight at the root.
        let mut node = x;
        while self.parent[node] as usize != root {
            let next = self.parent[node] as usize;
            self.parent[node] = root as u32;
            node = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b` and return the surviving root.
    ///
    /// The smaller set is attached below the larger one; on equal sizes the
    /// root of `b` is attached below the root of `a`.
    pub fn union(&mut self, a: usize, b: usize) -> usize {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big as u32;
        self.size[big] += self.size[small];
        big
    }

    /// Number of elements in the set rooted at `root`.
    ///
    /// Only meaningful for roots; interior nodes keep stale sizes.
    pub fn size_of(&self, root: usize) -> usize {
        self.size[root] as usize
    }

    /// Dense labels in raster order of first appearance, plus set sizes.
    pub fn labeling(&mut self) -> Labeling {
        const UNASSIGNED: u32 = u32::MAX;
        let n = self.len();
        let mut root_label = vec![UNASSIGNED; n];
        let mut labels = Vec::with_capacity(n);
        let mut region_sizes = Vec::new();

        for i in 0..n {
            let root = self.find(i);
            if root_label[root] == UNASSIGNED {
                root_label[root] = region_sizes.len() as u32;
                region_sizes.push(self.size_of(root));
            }
            labels.push(root_label[root]);
        }

        Labeling {
            labels,
            region_sizes,
        }
    }
}
