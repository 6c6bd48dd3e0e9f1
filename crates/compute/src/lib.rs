pub mod board;
pub mod collect;
pub mod divisible;
pub mod engine;
pub mod pacing;
pub mod pool;
pub mod probe;
pub mod sink;
pub mod sort;

pub use board::{BoardSink, BoardSnapshot, WorkerBoard, WorkerKey};
pub use collect::{traverse_range, RangeSpan, RangeSummary};
pub use divisible::{Characteristics, DivisibleUnit, InstrumentedIter, RangeSource, Splittable, VecSource};
pub use engine::{generate_input, Engine};
pub use pacing::Pacer;
pub use pool::{current_context, WorkerPool};
pub use probe::Probe;
pub use sink::{ChannelSink, EventSink, FanoutSink, NullSink, RecordingSink, TracingSink};
pub use sort::{SortElement, SortNode, SortOutcome, SortPolicy};
