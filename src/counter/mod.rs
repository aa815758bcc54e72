pub mod memory;
pub mod trait_def;

pub use memory::{MemoryCounter, PageVisits};
pub use trait_def::{Counter, CounterError, CounterResult};
