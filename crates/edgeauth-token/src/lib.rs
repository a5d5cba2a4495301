//! # edgeauth-token
//!
//! Token assembly and signing for edge authorization tokens.
//!
//! A token is an ordered sequence of `key=value` claim fields joined by a
//! field delimiter and terminated by an `hmac=` digest field:
//!
//! ```text
//! ip=1.2.3.4~st=1700000000~exp=1700000300~acl=/live/*~hmac=3f6a...
//! ```
//!
//! The digest covers the emitted claims plus, when present, a single-URL
//! scope and a salt — neither of which appears in the token text. Field
//! order is fixed; verifiers reconstruct the signing input byte for byte,
//! so any deviation in ordering, delimiters or escaping produces tokens
//! they will reject.

pub mod claims;
pub mod duration;
pub mod error;
pub mod keys;
pub mod token;

pub use claims::{Algorithm, Scope, TokenClaims};
pub use duration::parse_duration;
pub use error::TokenError;
pub use keys::decode_key;
pub use token::{
    DEFAULT_ACL_DELIMITER, DEFAULT_FIELD_DELIMITER, SignedToken, TokenSigner, escape_component,
};
