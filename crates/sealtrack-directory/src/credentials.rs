// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Salted password digests for technician logins.

use sha2::{Digest, Sha256};

/// Random per-account salt.
pub(crate) fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Hex SHA-256 digest of `salt:password`.
pub(crate) fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-shape comparison of a candidate password against a stored
/// salt + digest pair.
pub(crate) fn verify(salt: &str, stored_digest: &str, password: &str) -> bool {
    digest(salt, password) == stored_digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_round_trip() {
        let salt = new_salt();
        let stored = digest(&salt, "hunter2");
        assert!(verify(&salt, &stored, "hunter2"));
        assert!(!verify(&salt, &stored, "hunter3"));
    }

    #[test]
    fn same_password_different_salt_differs() {
        let a = digest(&new_salt(), "hunter2");
        let b = digest(&new_salt(), "hunter2");
        assert_ne!(a, b);
    }
}
