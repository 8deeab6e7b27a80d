//! Sampled metric recording
//!
//! Samples are kept in a bounded in-process buffer; exporting them anywhere
//! is left to the caller via [`MetricsBuffer::snapshot`].

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

pub const METRICS_BUFFER_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub kind: MetricKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
            tags: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Bounded sample buffer
///
/// When full, the oldest half is discarded before the new sample is stored.
#[derive(Debug)]
pub struct MetricsBuffer {
    samples: Mutex<Vec<MetricSample>>,
    capacity: usize,
    sample_rate: f64,
    enabled: bool,
}

impl MetricsBuffer {
    pub fn new(enabled: bool, sample_rate: f64) -> Self {
        Self::with_capacity(enabled, sample_rate, METRICS_BUFFER_CAPACITY)
    }

    pub fn with_capacity(enabled: bool, sample_rate: f64, capacity: usize) -> Self {
        Self {
            samples: Mutex::new(Vec::new()),
            capacity: capacity.max(2),
            sample_rate: sample_rate.clamp(0.0, 1.0),
            enabled,
        }
    }

    /// Store `sample` if recording is enabled and it wins the sampling draw
    ///
    /// Returns whether the sample was kept.
    pub fn record(&self, sample: MetricSample) -> bool {
        if !self.enabled || rand::random::<f64>() > self.sample_rate {
            return false;
        }

        let mut samples = self.samples.lock();
        if samples.len() >= self.capacity {
            let half = samples.len() / 2;
            samples.drain(..half);
        }
        samples.push(sample);
        true
    }

    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.samples.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn clear(&self) {
        self.samples.lock().clear();
    }
}
