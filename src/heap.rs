//! Binary heaps with explicit live-entry accounting.
//!
//! Selection code marks entries as logically removed without touching the
//! backing array, so the live counter can diverge from the physical length
//! until stale roots get discarded.

/// Which entry belongs at the root
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Orientation {
    Max,
    Min,
}

impl Orientation {
    #[inline]
    fn outranks<T: Ord>(&self, a: &T, b: &T) -> bool {
        match self {
            Orientation::Max => a > b,
            Orientation::Min => a < b,
        }
    }
}

/// Array-backed binary heap whose logical size is tracked separately
/// from the backing array.
///
/// `insert` counts the new entry as live; `pop` is physical removal only.
/// Callers popping a live root follow up with [`RankedHeap::retire`], and
/// callers discarding an already retired root pop without it. `retire` and
/// `restore` flip an in-place entry between live and retired.
pub struct RankedHeap<T> {
    entries: Vec<T>,
    orientation: Orientation,
    live: usize,
}

impl<T: Ord> RankedHeap<T> {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            entries: Vec::new(),
            orientation,
            live: 0,
        }
    }

    /// Bulk construction in O(n); every entry starts live.
    pub fn from_vec(orientation: Orientation, entries: Vec<T>) -> Self {
        let mut heap = Self {
            live: entries.len(),
            entries,
            orientation,
        };
        for ix in (0..heap.entries.len() / 2).rev() {
            heap.sift_down(ix);
        }
        heap
    }

    pub fn insert(&mut self, entry: T) {
        self.entries.push(entry);
        self.live += 1;
        self.sift_up(self.entries.len() - 1);
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.first()
    }

    /// Removes and returns the root. The live counter is left untouched.
    pub fn pop(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(entry)
    }

    /// Marks one physically present entry as logically removed.
    pub fn retire(&mut self) {
        self.live = self
            .live
            .checked_sub(1)
            .expect("retired more entries than the heap holds");
    }

    /// Makes one retired entry count as live again.
    pub fn restore(&mut self) {
        self.live += 1;
        assert!(
            self.live <= self.entries.len(),
            "restored more entries than the heap holds"
        );
    }

    /// Number of live entries
    pub fn live(&self) -> usize {
        self.live
    }

    /// Physical length of the backing array, retired entries included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    fn sift_up(&mut self, mut ix: usize) {
        while ix > 0 {
            let parent = (ix - 1) / 2;
            if self.orientation.outranks(&self.entries[ix], &self.entries[parent]) {
                self.entries.swap(ix, parent);
                ix = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut ix: usize) {
        loop {
            let left = 2 * ix + 1;
            if left >= self.entries.len() {
                break;
            }
            let mut best = left;
            let right = left + 1;
            if right < self.entries.len()
                && self.orientation.outranks(&self.entries[right], &self.entries[left])
            {
                best = right;
            }
            if self.orientation.outranks(&self.entries[best], &self.entries[ix]) {
                self.entries.swap(ix, best);
                ix = best;
            } else {
                break;
            }
        }
    }
}
