//! tally core: the persisted visit counter and the error surface shared by
//! the server and any embedding tooling.
//!
//! This crate carries no async runtime or HTTP dependencies. The counter
//! store performs blocking file I/O guarded by an OS-level exclusive lock,
//! so it is safe to share between threads and between processes that point
//! at the same backing file.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Storage failures either degrade to a count (see [`counter::CounterStore`])
//! or surface as `TallyError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod counter;
pub mod error;

/// Shared result type.
pub use error::{Result, TallyError};
