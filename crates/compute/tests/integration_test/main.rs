/// Integration tests for the scheduler demo covering both sort strategies,
/// the event stream each run produces, range traversal, and property checks
/// over arbitrary inputs.

mod helpers;
mod instrumentation;
mod properties;
mod range;
mod sort_variants;
