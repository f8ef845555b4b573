// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job status transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Unknown report format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
