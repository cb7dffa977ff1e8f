//! Error types for topology validation

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown node: {0}")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
