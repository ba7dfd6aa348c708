//! Credential obfuscation — spec §4.1.
//!
//! A symmetric XOR stream over a machine-derived key, base64-encoded for
//! storage. This "prevents casual disclosure in the on-disk database"; it is
//! **not** a cryptographic guarantee. A strong implementation should
//! substitute an OS keychain behind the same two functions — the interface
//! ([`encrypt`]/[`decrypt`]) is deliberately just two pure functions so that
//! substitution is a drop-in change, not a redesign.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};

/// Derive a 32-byte key from machine-identifying strings (hostname, machine
/// architecture, and the invoking user), the way the original
/// `db_agent.storage.encryption` module does: SHA-256 over the identifiers
/// joined with `|`. This is not a secret in the cryptographic sense — it
/// merely ties the obfuscation to one machine so that copying the on-disk
/// database elsewhere does not hand over plaintext for free.
fn machine_key() -> [u8; 32] {
    let hostname = hostname();
    let machine = std::env::consts::ARCH;
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "default".to_string());

    let combined = format!("{hostname}|{machine}|{user}");
    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    hasher.finalize().into()
}

fn hostname() -> String {
    #[cfg(unix)]
    {
        if let Ok(name) = std::env::var("HOSTNAME") {
            return name;
        }
        // Fall back to uname(2) via the libc-free `gethostname` shim exposed
        // through `std`'s own platform plumbing is not available, so we read
        // /proc/sys/kernel/hostname on Linux, which is always present.
        if let Ok(contents) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
            return contents.trim().to_string();
        }
    }
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "unknown-host".to_string())
}

/// XOR `data` with `key`, repeating the key as needed.
fn xor_bytes(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

/// Obfuscate a plaintext credential for storage.
///
/// Returns an empty string for empty input, matching [`decrypt`]'s behavior
/// on failure so a round trip through an unset field is a no-op.
#[must_use]
pub fn encrypt(plain_text: &str) -> String {
    if plain_text.is_empty() {
        return String::new();
    }
    let key = machine_key();
    let encrypted = xor_bytes(plain_text.as_bytes(), &key);
    BASE64.encode(encrypted)
}

/// Recover the plaintext from a blob produced by [`encrypt`].
///
/// Per spec §7, decryption failure (corrupt blob, or a database moved to a
/// different machine so the derived key no longer matches) returns an empty
/// string rather than propagating an error — the caller's subsequent
/// connection attempt fails cleanly instead of crashing the engine.
#[must_use]
pub fn decrypt(encrypted_text: &str) -> String {
    try_decrypt(encrypted_text).unwrap_or_default()
}

fn try_decrypt(encrypted_text: &str) -> CryptoResult<String> {
    if encrypted_text.is_empty() {
        return Ok(String::new());
    }
    let key = machine_key();
    let encrypted = BASE64
        .decode(encrypted_text)
        .map_err(|_| CryptoError::InvalidBase64Encoding)?;
    let decrypted = xor_bytes(&encrypted, &key);
    String::from_utf8(decrypted).map_err(|_| CryptoError::InvalidUtf8)
}

/// Mask a secret for display/audit purposes, showing only the last 4
/// characters (spec §3: "never emitted in audit payloads" — callers use this
/// when a secret must still be referenced in a human-facing message).
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    if secret.len() <= 4 {
        "*".repeat(secret.len())
    } else {
        format!("{}...{}", "*".repeat(4), &secret[secret.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let plain = "hunter2-super-secret";
        let cipher = encrypt(plain);
        assert_ne!(cipher, plain);
        assert_eq!(decrypt(&cipher), plain);
    }

    #[test]
    fn empty_round_trips_to_empty() {
        assert_eq!(encrypt(""), "");
        assert_eq!(decrypt(""), "");
    }

    #[test]
    fn corrupt_blob_decrypts_to_empty_not_error() {
        assert_eq!(decrypt("not valid base64 !!!"), "");
    }

    #[test]
    fn mask_secret_short() {
        assert_eq!(mask_secret("abc"), "***");
    }

    #[test]
    fn mask_secret_long() {
        assert_eq!(mask_secret("sk-1234567890abcdef"), "****...cdef");
    }
}
