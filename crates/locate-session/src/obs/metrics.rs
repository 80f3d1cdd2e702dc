//! Label-keyed counters and gauges backed by `DashMap`.
//!
//! Labels are flattened into sorted key vectors to keep deterministic
//! identity regardless of the order callers pass them in.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Helper to escape label values.
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

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Rendered sample lines are sorted so output is stable across runs.
fn render_sorted<V>(
    map: &DashMap<Vec<(String, String)>, V>,
    name: &str,
    out: &mut String,
    load: impl Fn(&V) -> String,
) {
    let mut lines: Vec<String> = map
        .iter()
        .map(|r| {
            let labels = label_str(r.key());
            if labels.is_empty() {
                format!("{} {}", name, load(r.value()))
            } else {
                format!("{}{{{}}} {}", name, labels, load(r.value()))
            }
        })
        .collect();
    lines.sort();
    for l in lines {
        let _ = writeln!(out, "{l}");
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set, zero if never touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        render_sorted(&self.map, name, out, |c| c.load(Ordering::Relaxed).to_string());
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<Vec<(String, String)>, AtomicI64>,
}

impl GaugeVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) { self.add(labels, 1); }
    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) { self.add(labels, -1); }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        render_sorted(&self.map, name, out, |g| g.load(Ordering::Relaxed).to_string());
    }
}

#[derive(Default)]
pub struct LocateMetrics {
    pub records_decoded: CounterVec,
    /// Labelled by error code.
    pub decode_failures: CounterVec,
    pub unmatched_capabilities: CounterVec,
    pub unknown_fields: CounterVec,
    /// Labelled `result=created|updated`.
    pub cache_merges: CounterVec,
    pub cache_entries: GaugeVec,
    /// Labelled by request kind and `outcome=queued|duplicate|dropped`.
    pub requests: CounterVec,
    /// Labelled `outcome=explicit|implicit|unsolicited|failed_*`.
    pub resolutions: CounterVec,
}

impl LocateMetrics {
    /// Render all registered metrics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.records_decoded.render("locate_records_decoded_total", &mut out);
        self.decode_failures.render("locate_decode_failures_total", &mut out);
        self.unmatched_capabilities.render("locate_unmatched_capabilities_total", &mut out);
        self.unknown_fields.render("locate_unknown_fields_total", &mut out);
        self.cache_merges.render("locate_cache_merges_total", &mut out);
        self.cache_entries.render("locate_cache_entries", &mut out);
        self.requests.render("locate_requests_total", &mut out);
        self.resolutions.render("locate_resolutions_total", &mut out);
        out
    }
}
