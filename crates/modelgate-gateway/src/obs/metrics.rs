//! Minimal metrics registry for the gateway.
//!
//! No external dependencies are used; counters and histograms with dynamic
//! labels are backed by `DashMap`. Labels are flattened into sorted key
//! vectors to keep deterministic ordering. Histogram buckets are fixed in
//! microseconds to avoid floating point math.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn render_labels(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, render_labels(r.key()), val);
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
    map: DashMap<Vec<(String, String)>, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets (microsecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_default();
        let micros = duration.as_micros() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let label_str = render_labels(r.key());
            let prefix = if label_str.is_empty() { String::new() } else { format!("{},", label_str) };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, label_str, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, label_str, count);
        }
    }
}

#[derive(Default)]
pub struct GatewayMetrics {
    /// Labels: `outcome` (ok, unauthorized, denied, failed), `status`.
    pub requests: CounterVec,
    /// Labels: `outcome`. Only requests that reached the dispatcher.
    pub dispatch_duration: HistogramVec,
    draining: AtomicBool,
}

impl GatewayMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Model/method names are caller-controlled, so they never become labels.
    pub fn record_request(&self, outcome: &str, status: u16) {
        let status = status.to_string();
        self.requests.inc(&[("outcome", outcome), ("status", &status)]);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests.render("modelgate_requests_total", &mut out);
        self.dispatch_duration.render("modelgate_dispatch_duration_micros", &mut out);
        let _ = writeln!(
            out,
            "# TYPE modelgate_draining gauge\nmodelgate_draining {}",
            if self.is_draining() { 1 } else { 0 }
        );
        out
    }
}
