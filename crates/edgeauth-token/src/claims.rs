//! Claim inputs for signed authorization tokens.

use crate::error::TokenError;
use std::fmt;
use std::str::FromStr;

/// What a token authorizes: a path pattern set or a single URL.
///
/// Exactly one scope exists per token by construction; supplying both an
/// ACL and a URL is a caller-side input error, not a state this type can
/// represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// ACL pattern(s), pre-joined by the caller (e.g. `/live/*!/vod/*`).
    ///
    /// The value may contain wildcard and delimiter characters the verifier
    /// matches literally; it is never escaped.
    Acl(String),

    /// A single URL path (e.g. `/path/file`).
    ///
    /// The URL is covered by the signature but never emitted in the token.
    Url(String),
}

/// HMAC digest algorithm used to sign a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// HMAC-SHA256 (default).
    #[default]
    Sha256,
    /// HMAC-SHA1, for verifiers that predate SHA-256 support.
    Sha1,
    /// HMAC-MD5, for legacy verifiers only.
    Md5,
}

impl Algorithm {
    /// Canonical lowercase name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha1 => "sha1",
            Algorithm::Md5 => "md5",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    /// Parse an algorithm name. Unrecognized names are rejected rather than
    /// silently falling back to SHA-256, so caller typos surface early.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Algorithm::Sha256),
            "sha1" => Ok(Algorithm::Sha1),
            "md5" => Ok(Algorithm::Md5),
            other => Err(TokenError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// The access-control claims carried by one token.
///
/// Construct with [`TokenClaims::new`] and the chained setters; the struct is
/// handed to [`crate::TokenSigner::sign`] once and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// What the token grants access to.
    pub scope: Scope,

    /// Client IP the token is bound to.
    pub client_ip: Option<String>,

    /// Start of the validity window (unix seconds). When unset, no `st`
    /// claim is emitted and no already-expired check applies.
    pub start_time: Option<i64>,

    /// End of the validity window (unix seconds). Must be positive and,
    /// when a start time is set, strictly greater than it.
    pub expire_time: i64,

    /// Session identifier.
    pub session_id: Option<String>,

    /// Arbitrary opaque payload.
    pub payload: Option<String>,

    /// Extra salt mixed into the signing input only, never emitted.
    pub salt: Option<String>,

    /// Percent-encode and lower-case ip, id, data (and url in URL mode)
    /// before signing, for canonical cross-system matching.
    pub escape_early: bool,
}

impl TokenClaims {
    /// Create claims for the given scope and expiration.
    pub fn new(scope: Scope, expire_time: i64) -> Self {
        Self {
            scope,
            client_ip: None,
            start_time: None,
            expire_time,
            session_id: None,
            payload: None,
            salt: None,
            escape_early: false,
        }
    }

    /// Bind the token to a client IP.
    pub fn client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    /// Set the start of the validity window (unix seconds).
    pub fn start_time(mut self, start: i64) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Attach a session identifier.
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    /// Attach an opaque payload.
    pub fn payload(mut self, data: impl Into<String>) -> Self {
        self.payload = Some(data.into());
        self
    }

    /// Mix a salt into the signing input. The salt never appears in the
    /// emitted token.
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Enable or disable escape-early encoding of escapable claims.
    pub fn escape_early(mut self, on: bool) -> Self {
        self.escape_early = on;
        self
    }
}
