//! Duration strings for token TTLs.

use crate::error::TokenError;

/// Parse a TTL string like `300s`, `15m`, `1h` or `1h30m` into seconds.
///
/// Grammar: one or more `<integer><unit>` segments with units `s`, `m`,
/// `h` or `d`; a bare trailing integer is taken as seconds. The result
/// must be positive.
pub fn parse_duration(s: &str) -> Result<i64, TokenError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TokenError::InvalidDuration("empty duration".into()));
    }

    let mut total: i64 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(TokenError::InvalidDuration(format!(
                "expected a number in {s:?}"
            )));
        }
        let n: i64 = rest[..digits_end]
            .parse()
            .map_err(|_| TokenError::InvalidDuration(format!("bad number in {s:?}")))?;

        let (multiplier, unit_len) = match rest.as_bytes().get(digits_end) {
            None => (1, 0),
            Some(b's') => (1, 1),
            Some(b'm') => (60, 1),
            Some(b'h') => (3_600, 1),
            Some(b'd') => (86_400, 1),
            Some(_) => {
                return Err(TokenError::InvalidDuration(format!(
                    "unknown unit in {s:?}"
                )));
            }
        };

        total = n
            .checked_mul(multiplier)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| TokenError::InvalidDuration(format!("overflow in {s:?}")))?;
        rest = &rest[digits_end + unit_len..];
    }

    if total <= 0 {
        return Err(TokenError::InvalidDuration(
            "duration must be positive".into(),
        ));
    }
    Ok(total)
}
