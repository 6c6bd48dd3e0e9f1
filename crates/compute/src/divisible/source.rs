use std::collections::VecDeque;

use super::{Characteristics, Comparator, Splittable};

/// Half-open integer range `[next, end)`, split in half down to `min_split`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSource {
    next: i64,
    end: i64,
    min_split: usize,
}

impl RangeSource {
    pub fn new(start: i64, end: i64) -> Self {
        Self::with_min_split(start, end, 2)
    }

    /// Refuse to split once fewer than `min_split` elements remain.
    pub fn with_min_split(start: i64, end: i64, min_split: usize) -> Self {
        assert!(start <= end, "range start {} is past its end {}", start, end);
        Self {
            next: start,
            end,
            min_split: min_split.max(2),
        }
    }
}

impl Splittable for RangeSource {
    type Item = i64;

    fn try_advance<F: FnMut(i64)>(&mut self, mut visit: F) -> bool {
        if self.next < self.end {
            let value = self.next;
            self.next += 1;
            visit(value);
            true
        } else {
            false
        }
    }

    fn for_each_remaining<F: FnMut(i64)>(&mut self, mut visit: F) {
        let (from, to) = (self.next, self.end);
        self.next = to;
        for value in from..to {
            visit(value);
        }
    }

    fn try_split(&mut self) -> Option<Self> {
        let size = self.estimate_size();
        if size < self.min_split {
            return None;
        }
        let mid = self.next + (size / 2) as i64;
        let suffix = Self {
            next: mid,
            end: self.end,
            min_split: self.min_split,
        };
        self.end = mid;
        Some(suffix)
    }

    fn estimate_size(&self) -> usize {
        (self.end - self.next) as usize
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED
            | Characteristics::DISTINCT
            | Characteristics::SORTED
            | Characteristics::SIZED
            | Characteristics::SUBSIZED
            | Characteristics::NONNULL
            | Characteristics::IMMUTABLE
    }

    fn comparator(&self) -> Option<Comparator<i64>> {
        let natural: Comparator<i64> = |a, b| a.cmp(b);
        Some(natural)
    }
}

/// Owned elements, split in half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecSource<T> {
    items: VecDeque<T>,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl<T: Send> Splittable for VecSource<T> {
    type Item = T;

    fn try_advance<F: FnMut(T)>(&mut self, mut visit: F) -> bool {
        match self.items.pop_front() {
            Some(item) => {
                visit(item);
                true
            }
            None => false,
        }
    }

    fn try_split(&mut self) -> Option<Self> {
        if self.items.len() < 2 {
            return None;
        }
        let suffix = self.items.split_off(self.items.len() / 2);
        Some(Self { items: suffix })
    }

    fn estimate_size(&self) -> usize {
        self.items.len()
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED | Characteristics::SIZED | Characteristics::SUBSIZED
    }
}
