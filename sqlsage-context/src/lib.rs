//! sqlsage-context — Token Counter & Context Compressor (spec §4.5,
//! component C5).
//!
//! [`TokenCounter`] estimates how many tokens a string or message history
//! will cost, using a real byte-pair encoder when one is available and
//! falling back to `len(text) / 4` otherwise (spec §4.5). [`Compressor`]
//! decides when a session's history has grown past the compression
//! threshold and, when it has, asks the LLM to summarize everything except
//! the most recent messages — taking care never to split an
//! assistant-with-tool-calls message from the tool results answering it.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod compressor;
mod counter;
mod limits;

pub use compressor::{CompressionOutcome, Compressor, DEFAULT_KEEP_RECENT, SUMMARY_MARKER};
pub use counter::TokenCounter;
pub use limits::{context_limit, threshold};
