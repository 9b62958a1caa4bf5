// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content fingerprints for idempotent work item insertion.

use sha2::{Digest, Sha256};

use crate::types::ActivityKind;

/// Compute the dedup fingerprint of a work item.
///
/// Hex-encoded SHA-256 over `(channel_id, kind, address, payload)` with NUL
/// separators so field boundaries cannot collide. Priority and timestamps
/// are deliberately excluded: re-submitting the same content at a different
/// priority must still deduplicate.
pub fn fingerprint(channel_id: &str, kind: ActivityKind, address: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(channel_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(kind.to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(address.as_bytes());
    hasher.update([0u8]);
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_yields_identical_fingerprint() {
        let a = fingerprint("sim1", ActivityKind::Sms, "31612345678", "hello");
        let b = fingerprint("sim1", ActivityKind::Sms, "31612345678", "hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn any_field_change_changes_the_fingerprint() {
        let base = fingerprint("sim1", ActivityKind::Sms, "31612345678", "hello");
        assert_ne!(base, fingerprint("sim2", ActivityKind::Sms, "31612345678", "hello"));
        assert_ne!(base, fingerprint("sim1", ActivityKind::Call, "31612345678", "hello"));
        assert_ne!(base, fingerprint("sim1", ActivityKind::Sms, "31612345679", "hello"));
        assert_ne!(base, fingerprint("sim1", ActivityKind::Sms, "31612345678", "hello!"));
    }

    #[test]
    fn field_boundaries_do_not_collide() {
        // "ab" + "c" vs "a" + "bc" must differ thanks to the separators.
        let a = fingerprint("sim", ActivityKind::Sms, "ab", "c");
        let b = fingerprint("sim", ActivityKind::Sms, "a", "bc");
        assert_ne!(a, b);
    }
}
