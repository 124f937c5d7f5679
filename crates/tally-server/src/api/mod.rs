//! Public JSON API (`/api/counter/*`).

pub mod counter;

pub use counter::{get_counter, increment_counter, CountResponse};
