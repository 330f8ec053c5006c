//! Vault-style duration strings
//!
//! Accepts a whole number with an optional `s`, `m`, `h` or `d` suffix.
//! A bare number counts seconds.

use std::time::Duration;

use cabinet_common::{Error, Result};

/// Parse a duration such as `"8760h"`, `"30d"` or `"3600"`
///
/// # Errors
///
/// `InvalidParameters` for empty input, unknown units, zero or overflow.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim();
    let (digits, unit_secs) = match ttl.char_indices().last() {
        Some((idx, 's')) => (&ttl[..idx], 1),
        Some((idx, 'm')) => (&ttl[..idx], 60),
        Some((idx, 'h')) => (&ttl[..idx], 3_600),
        Some((idx, 'd')) => (&ttl[..idx], 86_400),
        Some(_) => (ttl, 1),
        None => return Err(Error::invalid_parameters("ttl must not be empty")),
    };

    let count: u64 = digits
        .parse()
        .map_err(|_| Error::invalid_parameters(format!("invalid ttl {ttl:?}")))?;
    if count == 0 {
        return Err(Error::invalid_parameters("ttl must be positive"));
    }

    count
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::invalid_parameters(format!("ttl {ttl:?} is too large")))
}
