//! sqlsage-crypto — credential obfuscation for the sqlsage agent conversation engine.
//!
//! Database passwords and LLM provider API keys are stored obfuscated rather
//! than in plaintext. This is deliberately weak symmetric obfuscation, not
//! encryption in the cryptographic sense: it defends against someone
//! skimming the on-disk database file, not against a determined attacker
//! with access to the same machine.
//!
//! # Example
//!
//! ```
//! use sqlsage_crypto::{encrypt, decrypt};
//!
//! let opaque = encrypt("super-secret-password");
//! assert_eq!(decrypt(&opaque), "super-secret-password");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod credential;
mod error;

pub mod prelude;

pub use credential::{decrypt, encrypt, mask_secret};
pub use error::{CryptoError, CryptoResult};
