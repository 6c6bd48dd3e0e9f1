//! Lazily splittable data sources and the instrumented unit that wraps them.
//!
//! A [`Splittable`] source can hand out its elements one at a time or in
//! bulk, and can divide itself in two. [`DivisibleUnit`] decorates any such
//! source with lifecycle events without changing what it yields, and
//! [`InstrumentedIter`] lets rayon drive the whole thing in parallel.

mod iter;
mod source;
mod unit;

use std::cmp::Ordering;

use bitflags::bitflags;

pub use iter::InstrumentedIter;
pub use source::{RangeSource, VecSource};
pub use unit::{DivisibleUnit, UnitLink};

bitflags! {
    /// Structural properties a source promises about its elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Characteristics: u32 {
        const DISTINCT = 0x0001;
        const SORTED = 0x0004;
        const ORDERED = 0x0010;
        const SIZED = 0x0040;
        const NONNULL = 0x0100;
        const IMMUTABLE = 0x0400;
        const CONCURRENT = 0x1000;
        const SUBSIZED = 0x4000;
    }
}

/// Ordering of a `SORTED` source's elements.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// A traversable source that can partition itself.
pub trait Splittable: Send + Sized {
    type Item: Send;

    /// Feed the next element to `visit`. Returns `false` once exhausted.
    fn try_advance<F: FnMut(Self::Item)>(&mut self, visit: F) -> bool;

    /// Feed every remaining element to `visit`.
    fn for_each_remaining<F: FnMut(Self::Item)>(&mut self, mut visit: F) {
        while self.try_advance(&mut visit) {}
    }

    /// Give away a suffix of the remaining elements, keeping the prefix.
    /// `None` means the source will not split any further.
    fn try_split(&mut self) -> Option<Self>;

    /// Number of elements left to traverse.
    fn estimate_size(&self) -> usize;

    fn characteristics(&self) -> Characteristics;

    /// Ordering for `SORTED` sources.
    fn comparator(&self) -> Option<Comparator<Self::Item>> {
        None
    }
}
