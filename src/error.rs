//! Error types for the cutting engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The job expanded to more unit panels than the engine will accept.
    #[error("job expands to {count} unit panels, limit is {limit}")]
    TooManyPanels { count: usize, limit: usize },

    /// Free-rectangle bookkeeping on one sheet grew past its ceiling.
    /// Indicates a pathological input (many tiny panels on a huge sheet).
    #[error("free-rectangle count on sheet {sheet} exceeded limit {limit}")]
    FreeRectOverflow { sheet: u32, limit: usize },

    /// Stock configuration that cannot open a sheet.
    #[error("invalid stock configuration: {0}")]
    InvalidStock(String),

    /// The roll inventory collaborator has no record for a fabric.
    #[error("no roll stock record for fabric '{0}'")]
    MissingRoll(String),
}
