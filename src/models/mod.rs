pub mod visit;

pub use visit::{PageVisitStats, StatsQuery, Visit};
