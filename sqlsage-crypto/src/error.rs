//! Credential store error types.

use thiserror::Error;

/// Errors that can occur during credential obfuscation.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The opaque blob was not valid base64.
    #[error("invalid base64 encoding")]
    InvalidBase64Encoding,

    /// The decrypted bytes were not valid UTF-8.
    #[error("decrypted payload was not valid UTF-8")]
    InvalidUtf8,
}

/// Result type for credential store operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
