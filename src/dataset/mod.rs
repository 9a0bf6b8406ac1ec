//! Timing datasets and their collection.
//!
//! A [`TimingDataset`] is an ordered run of [`TimingSample`]s for one key and
//! one leakage profile. Order is collection order; sweeps attack prefixes of
//! it, so nothing downstream may reorder it.

mod collector;

pub use collector::Collector;

use serde::{Deserialize, Serialize};

use crate::key::PublicKey;
use crate::statistics::{lag1_autocorrelation, mean, variance};
use crate::types::TimingSample;

/// How a dataset was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Seed of the input stream.
    pub seed: u64,
    /// Target registry name.
    pub target: String,
    /// Leakage profile name.
    pub profile: String,
    /// Wall-clock seconds spent collecting.
    pub collection_time_secs: f64,
}

/// Descriptive statistics of a dataset's elapsed times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of samples.
    pub samples: usize,
    /// Mean elapsed time.
    pub mean_ns: f64,
    /// Population standard deviation.
    pub std_ns: f64,
    /// Fastest sample.
    pub min_ns: f64,
    /// Slowest sample.
    pub max_ns: f64,
    /// Lag-1 autocorrelation in collection order. Near zero for a sound
    /// collection, since the noise and input streams are independent per call.
    pub lag1_autocorrelation: f64,
}

/// Ordered timing samples against one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingDataset {
    public: PublicKey,
    samples: Vec<TimingSample>,
    metadata: DatasetMetadata,
}

impl TimingDataset {
    /// Wrap already-collected samples.
    pub fn new(public: PublicKey, samples: Vec<TimingSample>, metadata: DatasetMetadata) -> Self {
        Self {
            public,
            samples,
            metadata,
        }
    }

    /// Public key the samples were taken against.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Collection metadata.
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in collection order.
    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    /// First `count` samples (all of them if `count` exceeds the length).
    pub fn prefix(&self, count: usize) -> &[TimingSample] {
        &self.samples[..count.min(self.samples.len())]
    }

    /// Iterate in collection order.
    pub fn iter(&self) -> std::slice::Iter<'_, TimingSample> {
        self.samples.iter()
    }

    /// Elapsed times in collection order.
    pub fn elapsed_times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_ns).collect()
    }

    /// Descriptive statistics of the elapsed times.
    pub fn summary(&self) -> DatasetSummary {
        let times = self.elapsed_times();
        let (min_ns, max_ns) = times
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| (lo.min(t), hi.max(t)));
        DatasetSummary {
            samples: times.len(),
            mean_ns: mean(&times),
            std_ns: variance(&times).sqrt(),
            min_ns: if times.is_empty() { 0.0 } else { min_ns },
            max_ns: if times.is_empty() { 0.0 } else { max_ns },
            lag1_autocorrelation: lag1_autocorrelation(&times),
        }
    }
}

impl<'a> IntoIterator for &'a TimingDataset {
    type Item = &'a TimingSample;
    type IntoIter = std::slice::Iter<'a, TimingSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
