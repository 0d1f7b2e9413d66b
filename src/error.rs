//! Main Crate Error

use crate::common::Id;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// yadht crate error enum.
pub enum Error {
    /// Identifier bytes are not exactly [ID_SIZE](crate::ID_SIZE) long.
    #[error("Invalid identifier: expected 20 bytes, got {0}")]
    InvalidIdSize(usize),

    /// Identifier text is not 40 hex characters.
    #[error("Invalid identifier: {0}")]
    InvalidIdHex(#[from] hex::FromHexError),

    /// Bucket range lower bound is above its upper bound.
    #[error("Invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: Id, end: Id },

    /// Node id lies outside the bucket's range.
    #[error("Node {id} is out of range [{start}, {end}]")]
    OutOfRange { id: Id, start: Id, end: Id },

    /// Bucket capacity must be at least one node.
    #[error("Invalid bucket size: {0}")]
    InvalidBucketSize(usize),
}

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
