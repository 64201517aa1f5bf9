//! Wallet address validation
//!
//! Addresses are the identity key of a user. They are stored lowercased so
//! checksummed and plain spellings of the same wallet map to one row.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-f]{40}$").expect("address regex is valid"));

/// Validate an address and return its canonical (lowercase, trimmed) form
pub fn normalize_address(raw: &str) -> Result<String> {
    let candidate = raw.trim().to_ascii_lowercase();
    if ADDRESS_RE.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(Error::InvalidAddress(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_checksummed() {
        let addr = normalize_address(" 0xAbCdEf0123456789aBcDeF0123456789abcdef01 ").unwrap();
        assert_eq!(addr, "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(normalize_address("").is_err());
        assert!(normalize_address("0x123").is_err());
        assert!(normalize_address("abcdef0123456789abcdef0123456789abcdef0101").is_err());
        assert!(normalize_address("0xZZcdef0123456789abcdef0123456789abcdef01").is_err());
    }
}
