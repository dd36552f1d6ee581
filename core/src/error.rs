//! Error types for the shelter graph engine.
//!
//! Storage failures never cross the engine boundary as errors; they are
//! absorbed into a [`crate::BuildStatus`]. The only query-time failure is a
//! reachability request for a shelter that is not a graph node.

use thiserror::Error;

use crate::model::ShelterId;

/// Failure reported by a [`crate::RecordStore`].
///
/// Kept distinct from an empty read: `Ok(vec![])` means "no matching
/// records", an error means the data could not be determined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or opened.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The store was reachable but the read failed.
    #[error("record store query failed: {0}")]
    Query(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}

/// Errors returned by engine queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Reachability was asked for a shelter that is not in the current graph.
    #[error("shelter {0} is not a node of the current graph")]
    NodeNotInGraph(ShelterId),
}

/// Result type alias for engine queries.
pub type Result<T> = std::result::Result<T, EngineError>;
