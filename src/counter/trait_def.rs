use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("no visits recorded for page")]
    NotFound,
    /// Backend failure; never produced by `MemoryCounter`, reserved for
    /// implementations that can hold inconsistent state.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type CounterResult<T> = Result<T, CounterError>;

/// Unique-visitor counting backend.
///
/// Implementations are called concurrently from every request handler and
/// must never block on I/O.
pub trait Counter: Send + Sync {
    /// Register a visit of `visitor_id` to `page`.
    ///
    /// The page entry is created on first visit. A visitor already counted
    /// for this page leaves the count unchanged.
    fn add_visit(&self, page: &str, visitor_id: &str) -> CounterResult<()>;

    /// Number of distinct visitors recorded for `page`.
    ///
    /// Returns `CounterError::NotFound` when the page was never visited.
    fn visits(&self, page: &str) -> CounterResult<u64>;

    /// Number of pages with at least one recorded visit
    fn pages(&self) -> usize;
}
