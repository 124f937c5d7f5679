//! Counter endpoints.
//!
//! Store calls are blocking (file lock + fs I/O) and run on tokio's blocking
//! pool. Every path answers 200 with a count: if the blocking task itself
//! fails, reads report 0 and increments report 1, the same values the store
//! degrades to.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;
use tally_core::counter::{DEFAULT_COUNT, RESET_COUNT};

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// `GET /api/counter`
pub async fn get_counter(State(state): State<AppState>) -> Json<CountResponse> {
    state.metrics().http_requests.inc(&[("route", "get_counter")]);

    let store = state.store();
    let count = match tokio::task::spawn_blocking(move || store.get_count()).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(error = %e, "counter read task failed");
            state.metrics().task_failures.inc(&[("op", "get")]);
            DEFAULT_COUNT
        }
    };

    tracing::debug!(count, "counter read");
    state.observe_count(count);
    Json(CountResponse { count })
}

/// `POST /api/counter/increment`
pub async fn increment_counter(State(state): State<AppState>) -> Json<CountResponse> {
    state.metrics().http_requests.inc(&[("route", "increment_counter")]);

    let store = state.store();
    let started = Instant::now();
    let count = match tokio::task::spawn_blocking(move || store.increment()).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(error = %e, "counter increment task failed");
            state.metrics().task_failures.inc(&[("op", "increment")]);
            RESET_COUNT
        }
    };
    state.metrics().increment_duration.observe(&[], started.elapsed());

    tracing::debug!(count, "counter incremented");
    state.observe_count(count);
    Json(CountResponse { count })
}
