//! Token assembly and HMAC signing.

use crate::claims::{Algorithm, Scope, TokenClaims};
use crate::error::TokenError;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;
use std::borrow::Cow;
use std::fmt;

/// Default delimiter joining `key=value` fields.
pub const DEFAULT_FIELD_DELIMITER: &str = "~";

/// Default delimiter joining multiple ACL patterns into one ACL value.
pub const DEFAULT_ACL_DELIMITER: &str = "!";

/// Encode one claim value for inclusion in a token field.
///
/// With escaping off the value passes through untouched. With escaping on it
/// is percent-encoded as a URL query component (space becomes `+`) and the
/// whole result is lower-cased, hex digits of the escapes included, so that
/// verifiers with different casing conventions compare equal.
pub fn escape_component(value: &str, escape: bool) -> Cow<'_, str> {
    if !escape {
        return Cow::Borrowed(value);
    }
    // urlencoding emits %20 for spaces; verifiers expect form-style '+'.
    // %20 can only appear as a complete escape triple, so the replace is
    // unambiguous.
    let encoded = urlencoding::encode(value).replace("%20", "+");
    Cow::Owned(encoded.to_lowercase())
}

/// A fully assembled, signed token: ordered `key=value` claim fields joined
/// by the field delimiter and terminated by an `hmac=` digest field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signs token claims with a shared secret.
#[derive(Debug)]
pub struct TokenSigner {
    key: Vec<u8>,
    algorithm: Algorithm,
    field_delimiter: String,
}

impl TokenSigner {
    /// Create a signer from raw key bytes. The key must be non-empty.
    pub fn new(key: Vec<u8>, algorithm: Algorithm) -> Result<Self, TokenError> {
        if key.is_empty() {
            return Err(TokenError::InvalidKey);
        }
        Ok(Self {
            key,
            algorithm,
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
        })
    }

    /// Override the delimiter joining `key=value` fields (default `~`).
    pub fn field_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.field_delimiter = delimiter.into();
        self
    }

    /// Assemble and sign a token.
    ///
    /// Claim fields are emitted in a fixed order the verifier depends on:
    /// ip, st, exp, acl, id, data, hmac. The signing input is the emitted
    /// claims plus, appended after them, `url=` (URL scope only) and
    /// `salt=` (when set) — both covered by the digest but never emitted.
    ///
    /// Preconditions are checked eagerly: the expiration must be positive
    /// and, when a start time is set, strictly greater than it.
    pub fn sign(&self, claims: &TokenClaims) -> Result<SignedToken, TokenError> {
        if claims.expire_time <= 0 {
            return Err(TokenError::NonPositiveExpiry(claims.expire_time));
        }
        if let Some(start) = claims.start_time {
            if claims.expire_time <= start {
                return Err(TokenError::AlreadyExpired {
                    start,
                    expire: claims.expire_time,
                });
            }
        }

        let escape = claims.escape_early;
        let mut fields: Vec<String> = Vec::new();
        if let Some(ip) = &claims.client_ip {
            fields.push(format!("ip={}", escape_component(ip, escape)));
        }
        if let Some(start) = claims.start_time {
            fields.push(format!("st={start}"));
        }
        fields.push(format!("exp={}", claims.expire_time));
        if let Scope::Acl(acl) = &claims.scope {
            // ACL patterns carry wildcard and delimiter characters the
            // verifier matches literally; never escaped.
            fields.push(format!("acl={acl}"));
        }
        if let Some(id) = &claims.session_id {
            fields.push(format!("id={}", escape_component(id, escape)));
        }
        if let Some(data) = &claims.payload {
            fields.push(format!("data={}", escape_component(data, escape)));
        }

        let mut hash_fields = fields.clone();
        if let Scope::Url(url) = &claims.scope {
            hash_fields.push(format!("url={}", escape_component(url, escape)));
        }
        if let Some(salt) = &claims.salt {
            hash_fields.push(format!("salt={salt}"));
        }

        let signing_input = hash_fields.join(&self.field_delimiter);
        let digest = self.digest_hex(signing_input.as_bytes());
        tracing::debug!(
            algorithm = %self.algorithm,
            emitted_fields = fields.len(),
            "signed token"
        );

        fields.push(format!("hmac={digest}"));
        Ok(SignedToken(fields.join(&self.field_delimiter)))
    }

    fn digest_hex(&self, data: &[u8]) -> String {
        match self.algorithm {
            Algorithm::Sha256 => {
                let mut mac =
                    <Hmac<Sha256>>::new_from_slice(&self.key).expect("HMAC key must be valid");
                mac.update(data);
                hex::encode(mac.finalize().into_bytes())
            }
            Algorithm::Sha1 => {
                let mut mac =
                    <Hmac<Sha1>>::new_from_slice(&self.key).expect("HMAC key must be valid");
                mac.update(data);
                hex::encode(mac.finalize().into_bytes())
            }
            Algorithm::Md5 => {
                let mut mac =
                    <Hmac<Md5>>::new_from_slice(&self.key).expect("HMAC key must be valid");
                mac.update(data);
                hex::encode(mac.finalize().into_bytes())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_key;

    fn signer() -> TokenSigner {
        TokenSigner::new(decode_key("deadbeef").unwrap(), Algorithm::Sha256).unwrap()
    }

    fn hmac_sha256_hex(key: &[u8], data: &str) -> String {
        let mut mac = <Hmac<Sha256>>::new_from_slice(key).unwrap();
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn acl_token_matches_reference_shape() {
        let claims = TokenClaims::new(Scope::Acl("/*".into()), 100);
        let token = signer().sign(&claims).unwrap();

        let expected_digest =
            hmac_sha256_hex(&[0xde, 0xad, 0xbe, 0xef], "exp=100~acl=/*");
        assert_eq!(
            token.as_str(),
            format!("exp=100~acl=/*~hmac={expected_digest}")
        );
        assert_eq!(expected_digest.len(), 64);
        assert!(expected_digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signing_is_deterministic() {
        let claims = TokenClaims::new(Scope::Acl("/live/*".into()), 12_345)
            .client_ip("10.0.0.1")
            .session_id("abc");
        let a = signer().sign(&claims).unwrap();
        let b = signer().sign(&claims).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn url_and_salt_cover_digest_but_stay_hidden() {
        let claims = TokenClaims::new(Scope::Url("/path/file".into()), 100).salt("xyz");
        let token = signer().sign(&claims).unwrap();

        assert!(!token.as_str().contains("url="));
        assert!(!token.as_str().contains("salt="));

        let expected_digest =
            hmac_sha256_hex(&[0xde, 0xad, 0xbe, 0xef], "exp=100~url=/path/file~salt=xyz");
        assert_eq!(token.as_str(), format!("exp=100~hmac={expected_digest}"));
    }

    #[test]
    fn salt_changes_the_digest() {
        let base = TokenClaims::new(Scope::Acl("/*".into()), 100);
        let salted = base.clone().salt("xyz");
        assert_ne!(signer().sign(&base).unwrap(), signer().sign(&salted).unwrap());
    }

    #[test]
    fn url_changes_the_digest() {
        let a = TokenClaims::new(Scope::Url("/a".into()), 100);
        let b = TokenClaims::new(Scope::Url("/b".into()), 100);
        assert_ne!(signer().sign(&a).unwrap(), signer().sign(&b).unwrap());
    }

    #[test]
    fn fields_are_emitted_in_canonical_order() {
        let claims = TokenClaims::new(Scope::Acl("/vod/*".into()), 200)
            .client_ip("1.2.3.4")
            .start_time(100)
            .session_id("sess")
            .payload("extra");
        let token = signer().sign(&claims).unwrap();

        let keys: Vec<&str> = token
            .as_str()
            .split('~')
            .map(|field| field.split_once('=').unwrap().0)
            .collect();
        assert_eq!(keys, ["ip", "st", "exp", "acl", "id", "data", "hmac"]);
    }

    #[test]
    fn acl_is_never_escaped() {
        let claims =
            TokenClaims::new(Scope::Acl("/live/*!/vod/*".into()), 100).escape_early(true);
        let token = signer().sign(&claims).unwrap();
        assert!(token.as_str().contains("acl=/live/*!/vod/*"));
    }

    #[test]
    fn escape_early_lower_cases_escapable_fields() {
        let claims = TokenClaims::new(Scope::Url("/Path With/UPPER".into()), 100)
            .client_ip("2001:DB8::1")
            .session_id("Session ID")
            .escape_early(true);
        let token = signer().sign(&claims).unwrap();
        assert!(!token.as_str().contains(char::is_uppercase));
        assert!(token.as_str().contains("id=session+id"));
        assert!(token.as_str().contains("ip=2001%3adb8%3a%3a1"));
    }

    #[test]
    fn custom_field_delimiter_is_used_in_both_token_and_digest() {
        let claims = TokenClaims::new(Scope::Acl("/*".into()), 100).session_id("abc");
        let token = signer().field_delimiter(";").sign(&claims).unwrap();

        let expected_digest =
            hmac_sha256_hex(&[0xde, 0xad, 0xbe, 0xef], "exp=100;acl=/*;id=abc");
        assert_eq!(
            token.as_str(),
            format!("exp=100;acl=/*;id=abc;hmac={expected_digest}")
        );
    }

    #[test]
    fn sha1_and_md5_digest_lengths() {
        let claims = TokenClaims::new(Scope::Acl("/*".into()), 100);
        let key = decode_key("deadbeef").unwrap();

        let sha1_token = TokenSigner::new(key.clone(), Algorithm::Sha1)
            .unwrap()
            .sign(&claims)
            .unwrap();
        let md5_token = TokenSigner::new(key, Algorithm::Md5)
            .unwrap()
            .sign(&claims)
            .unwrap();

        let digest_of = |t: &SignedToken| {
            t.as_str()
                .rsplit_once("hmac=")
                .map(|(_, d)| d.to_string())
                .unwrap()
        };
        assert_eq!(digest_of(&sha1_token).len(), 40);
        assert_eq!(digest_of(&md5_token).len(), 32);
    }

    #[test]
    fn non_positive_expiry_rejected() {
        let claims = TokenClaims::new(Scope::Acl("/*".into()), 0);
        assert_eq!(
            signer().sign(&claims).unwrap_err(),
            TokenError::NonPositiveExpiry(0)
        );
    }

    #[test]
    fn expiry_at_or_before_start_rejected() {
        let claims = TokenClaims::new(Scope::Acl("/*".into()), 50).start_time(50);
        assert_eq!(
            signer().sign(&claims).unwrap_err(),
            TokenError::AlreadyExpired {
                start: 50,
                expire: 50
            }
        );
    }

    #[test]
    fn empty_key_rejected_at_construction() {
        assert_eq!(
            TokenSigner::new(Vec::new(), Algorithm::Sha256).unwrap_err(),
            TokenError::InvalidKey
        );
    }

    #[test]
    fn escape_component_passthrough_when_off() {
        assert_eq!(escape_component("A B/C", false), "A B/C");
    }

    #[test]
    fn escape_component_encodes_and_lower_cases() {
        assert_eq!(escape_component("A B/C", true), "a+b%2fc");
        assert_eq!(escape_component("~safe-chars_.", true), "~safe-chars_.");
    }

    #[test]
    fn escape_component_handles_literal_percent() {
        // A literal "%20" in the input must not be confused with an escaped
        // space.
        assert_eq!(escape_component("%20", true), "%2520");
    }
}
