//! Persisted visit counter.
//!
//! - [`parse_or_default`]: pure decoding of the backing record
//! - [`CounterStore`]: lock-guarded read-modify-write over a single file

pub mod parse;
pub mod store;

pub use parse::{parse_or_default, DEFAULT_COUNT};
pub use store::{CounterStore, DEFAULT_FILE_NAME, RESET_COUNT};
