pub mod config;
pub mod error;
pub mod event;
pub mod task;

pub use config::{EngineConfig, SortStrategy};
pub use error::*;
pub use event::*;
pub use task::*;
