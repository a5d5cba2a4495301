//! Error types for token generation.

use thiserror::Error;

/// Errors that can occur while building a signed token.
///
/// All of these are fatal input-validation failures detected before any
/// field assembly or digest computation; nothing is retried and no partial
/// token is ever produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Both or neither of the ACL and URL scopes were specified.
    #[error("specify either an ACL or a URL scope exclusively")]
    ModeConflict,

    /// The secret key is not valid hex or decodes to zero bytes.
    #[error("invalid key: must be a non-empty hex string")]
    InvalidKey,

    /// The duration string could not be parsed as a positive span.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Neither an explicit expiration nor a duration was supplied.
    #[error("either an expiration time or a duration is required")]
    MissingExpiry,

    /// The resolved expiration is not a positive timestamp.
    #[error("expiration must be > 0 (got {0})")]
    NonPositiveExpiry(i64),

    /// The expiration does not fall after the start time.
    #[error("token already expired: expiration {expire} <= start {start}")]
    AlreadyExpired {
        /// Start of the validity window (unix seconds).
        start: i64,
        /// Requested expiration (unix seconds).
        expire: i64,
    },

    /// The algorithm name is not one of sha256, sha1 or md5.
    #[error("unknown algorithm '{0}' (expected sha256, sha1 or md5)")]
    UnknownAlgorithm(String),
}
