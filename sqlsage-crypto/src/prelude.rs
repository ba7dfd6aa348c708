//! Prelude module - commonly used items for convenient import.
//!
//! ```rust
//! use sqlsage_crypto::prelude::*;
//! ```

pub use crate::{CryptoError, CryptoResult, decrypt, encrypt, mask_secret};
