//! Collection fingerprints.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use alloc::string::String;
use core::fmt::Write;

use crate::collection::BadgeCollection;

pub type Fingerprint = [u8; 32];

/// BLAKE3 digest over the canonical collection contents.
///
/// Users are hashed in key order and badges in sequence order. Every string is
/// length-prefixed so `("ab", "c")` and `("a", "bc")` hash differently.
pub fn collection_fingerprint(collection: &BadgeCollection) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(collection.user_count() as u64).to_le_bytes());
    for (user_id, badges) in collection {
        hash_str(&mut hasher, user_id);
        hasher.update(&(badges.len() as u64).to_le_bytes());
        for badge in badges {
            hash_str(&mut hasher, &badge.tooltip);
            hash_str(&mut hasher, &badge.badge);
        }
    }

    *hasher.finalize().as_bytes()
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// Lowercase hex rendering, as carried in `ETag` headers.
pub fn to_hex(fingerprint: &Fingerprint) -> String {
    let mut out = String::with_capacity(fingerprint.len() * 2);
    for byte in fingerprint {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

pub fn fingerprint_hex(collection: &BadgeCollection) -> String {
    to_hex(&collection_fingerprint(collection))
}
