use rayon::iter::plumbing::{bridge_unindexed, Folder, UnindexedConsumer, UnindexedProducer};
use rayon::iter::ParallelIterator;

use super::{DivisibleUnit, Splittable};

/// Parallel iterator over an instrumented unit.
///
/// rayon decides when to ask for a split (more eagerly after a steal); the
/// source decides whether it can. Each leaf is traversed with
/// `for_each_remaining`, so every unit reports exactly one processing window.
pub struct InstrumentedIter<S: Splittable> {
    unit: DivisibleUnit<S>,
}

impl<S: Splittable> InstrumentedIter<S> {
    pub fn new(unit: DivisibleUnit<S>) -> Self {
        Self { unit }
    }
}

impl<S: Splittable> ParallelIterator for InstrumentedIter<S> {
    type Item = S::Item;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge_unindexed(UnitProducer(self.unit), consumer)
    }
}

struct UnitProducer<S: Splittable>(DivisibleUnit<S>);

impl<S: Splittable> UnindexedProducer for UnitProducer<S> {
    type Item = S::Item;

    fn split(mut self) -> (Self, Option<Self>) {
        let other = self.0.try_split().map(UnitProducer);
        (self, other)
    }

    fn fold_with<F>(mut self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        let mut slot = Some(folder);
        self.0.for_each_remaining(|item| {
            slot = slot.take().map(|f| if f.full() { f } else { f.consume(item) });
        });
        slot.unwrap_or_else(|| unreachable!("folder is put back after every item"))
    }
}
