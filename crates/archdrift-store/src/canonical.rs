//! Canonicalization concentrates determinism: every content-addressed
//! artifact in this crate derives its bytes from this one routine rather
//! than recomputing `serde_json` settings per call site.

use serde::Serialize;
use sha2::{Digest, Sha256};

use archdrift_core::errors::{ArchDriftError, ArchDriftResult};

/// Serialize `value` as canonical JSON: sorted keys, no insignificant
/// whitespace, UTF-8. `serde_json`'s `Value` sorts map keys by default
/// when the `preserve_order` feature is off, which is how this crate's
/// `Cargo.toml` pulls it in.
pub fn canonical_bytes<T: Serialize>(value: &T) -> ArchDriftResult<Vec<u8>> {
    let as_value = serde_json::to_value(value)
        .map_err(|e| ArchDriftError::json("<canonicalize>".to_string(), e))?;
    serde_json::to_vec(&as_value).map_err(|e| ArchDriftError::json("<canonicalize>".to_string(), e))
}

/// SHA-256 of arbitrary bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 of `value`'s canonical bytes, lowercase hex.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> ArchDriftResult<String> {
    Ok(sha256_hex(&canonical_bytes(value)?))
}

/// First 16 hex characters of a SHA-256 digest, used for repo ids and
/// snapshot ids.
pub fn truncated_id(bytes: &[u8]) -> String {
    let full = sha256_hex(bytes);
    full[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_sorts_keys_and_drops_whitespace() {
        let v = json!({"b": 1, "a": 2});
        let bytes = canonical_bytes(&v).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn canonical_hash_is_stable() {
        let v = json!({"x": [1, 2, 3]});
        let h1 = canonical_hash_hex(&v).unwrap();
        let h2 = canonical_hash_hex(&v).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn truncated_id_is_16_hex_chars() {
        let id = truncated_id(b"hello");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
