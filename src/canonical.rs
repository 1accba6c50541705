//! Canonical serialization for deterministic fingerprints.
//!
//! Graph exports are fingerprinted so that two alignments of the same input
//! can be compared cheaply. Determinism rules:
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Stable Vec order: vectors serialize in index order
//! - No HashMap in fingerprinted data: use BTreeMap or sorted Vecs

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("canonical serialization failed")
}

/// Compute the canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// Compute the canonical hash and return it as a hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Probe {
        label: String,
        count: u32,
    }

    #[test]
    fn hash_is_stable() {
        let p = Probe {
            label: "cat".to_string(),
            count: 3,
        };
        assert_eq!(canonical_hash(&p), canonical_hash(&p));
    }

    #[test]
    fn hash_tracks_content() {
        let a = Probe {
            label: "cat".to_string(),
            count: 3,
        };
        let b = Probe {
            label: "cat".to_string(),
            count: 4,
        };
        assert_ne!(canonical_hash_hex(&a), canonical_hash_hex(&b));
    }
}
