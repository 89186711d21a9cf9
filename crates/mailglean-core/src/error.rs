use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("entity span finder failed: {0}")]
    SpanFinder(String),
}
