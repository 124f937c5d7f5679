//! Minimal metrics registry for the server.
//!
//! No exporter crate is used; counters and histograms with dynamic labels are
//! backed by `DashMap` and rendered in Prometheus text format. Label sets are
//! sorted so the same labels always land on the same series. Histogram
//! buckets are fixed in microseconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_string(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| {
            let v = v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
            format!("{k}=\"{v}\"")
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}{{{}}} {val}", label_string(r.key()));
        }
    }
}

// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
const BUCKETS_MICROS: [u64; 9] = [100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Record one observation into the cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);
        for (bucket, &le) in hist.buckets.iter().zip(BUCKETS_MICROS.iter()) {
            if micros <= le {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for r in self.map.iter() {
            let hist = r.value();
            let labels = label_string(r.key());
            let prefix = if labels.is_empty() { String::new() } else { format!("{labels},") };

            for (bucket, le) in hist.buckets.iter().zip(BUCKETS_MICROS) {
                let n = bucket.load(Ordering::Relaxed);
                let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"{le}\"}} {n}");
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {count}");
            let _ = writeln!(out, "{name}_sum{{{labels}}} {}", hist.sum.load(Ordering::Relaxed));
            let _ = writeln!(out, "{name}_count{{{labels}}} {count}");
        }
    }
}

#[derive(Default)]
pub struct ServerMetrics {
    pub http_requests: CounterVec,
    pub increment_duration: HistogramVec, // microseconds, lock wait included
    pub task_failures: CounterVec,
}

impl ServerMetrics {
    /// Render all series plus caller-provided gauge lines.
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.http_requests.render("tally_http_requests_total", &mut out);
        self.increment_duration.render("tally_increment_duration_micros", &mut out);
        self.task_failures.render("tally_store_task_failures_total", &mut out);
        for (k, v) in extra {
            let _ = writeln!(out, "# TYPE {k} gauge\n{k} {v}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_labels_are_order_insensitive() {
        let c = CounterVec::default();
        c.inc(&[("route", "get"), ("method", "GET")]);
        c.inc(&[("method", "GET"), ("route", "get")]);
        assert_eq!(c.get(&[("route", "get"), ("method", "GET")]), 2);
        assert_eq!(c.get(&[("route", "other")]), 0);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let m = ServerMetrics::default();
        m.increment_duration.observe(&[], Duration::from_micros(700));
        let text = m.render(&[]);
        assert!(text.contains("tally_increment_duration_micros_bucket{le=\"500\"} 0"));
        assert!(text.contains("tally_increment_duration_micros_bucket{le=\"1000\"} 1"));
        assert!(text.contains("tally_increment_duration_micros_bucket{le=\"+Inf\"} 1"));
        assert!(text.contains("tally_increment_duration_micros_sum{} 700"));
    }

    #[test]
    fn render_includes_extra_gauges() {
        let m = ServerMetrics::default();
        m.http_requests.inc(&[("route", "health")]);
        let text = m.render(&[("tally_counter_value", 12)]);
        assert!(text.contains("tally_http_requests_total{route=\"health\"} 1"));
        assert!(text.contains("tally_counter_value 12"));
    }
}
