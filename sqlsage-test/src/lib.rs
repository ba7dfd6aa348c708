//! Shared test fixtures and mocks for the sqlsage workspace.
//!
//! This crate provides fixture builders and mock implementations of
//! [`sqlsage_llm::LlmProvider`] and [`sqlsage_db::DbAdapter`] that can be
//! used across multiple sqlsage crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! sqlsage-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use sqlsage_test::{MockLlmProvider, test_connection_record};
//!
//!     #[tokio::test]
//!     async fn turn_loop_stops_on_end_turn() {
//!         let provider = MockLlmProvider::new().push_text("done");
//!         // ... build an Agent with `provider` and assert on the outcome.
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
