//! Leakage profiles: how much the extra reduction costs and what noise rides
//! on top of every measurement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, Result};
use crate::types::NS_PER_US;

/// Default simulated cost of processing one exponent bit.
pub const DEFAULT_BASE_COST_NS: f64 = 2_000.0;

/// Default noise standard deviation for the named presets.
pub const DEFAULT_NOISE_SIGMA_NS: f64 = 5_000.0;

/// Noise added to every simulated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseModel {
    /// No noise: elapsed time is an exact function of the exponent path.
    None,
    /// Zero-mean Gaussian noise.
    Gaussian {
        /// Standard deviation in nanoseconds.
        sigma_ns: f64,
    },
    /// Uniform noise on `[low_ns, high_ns]`.
    Uniform {
        /// Lower bound in nanoseconds.
        low_ns: f64,
        /// Upper bound in nanoseconds.
        high_ns: f64,
    },
}

impl NoiseModel {
    /// Build from a kind name and a parameter mapping.
    ///
    /// Recognized kinds: `none`, `gaussian` (`sigma_ns`), `uniform`
    /// (`low_ns`, `high_ns`).
    pub fn from_params(kind: &str, params: &BTreeMap<String, f64>) -> Result<Self> {
        let get = |key: &str| {
            params.get(key).copied().ok_or_else(|| {
                LabError::domain(format!("{} noise requires parameter `{}`", kind, key))
            })
        };
        let model = match kind {
            "none" => NoiseModel::None,
            "gaussian" => NoiseModel::Gaussian {
                sigma_ns: get("sigma_ns")?,
            },
            "uniform" => NoiseModel::Uniform {
                low_ns: get("low_ns")?,
                high_ns: get("high_ns")?,
            },
            other => {
                return Err(LabError::UnknownConfiguration {
                    kind: "noise",
                    name: other.to_string(),
                })
            }
        };
        model.validate()?;
        Ok(model)
    }

    /// Kind name as used by [`NoiseModel::from_params`].
    pub fn kind(&self) -> &'static str {
        match self {
            NoiseModel::None => "none",
            NoiseModel::Gaussian { .. } => "gaussian",
            NoiseModel::Uniform { .. } => "uniform",
        }
    }

    /// Check parameters are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        match *self {
            NoiseModel::None => Ok(()),
            NoiseModel::Gaussian { sigma_ns } => {
                if sigma_ns.is_finite() && sigma_ns >= 0.0 {
                    Ok(())
                } else {
                    Err(LabError::domain("gaussian sigma must be finite and >= 0"))
                }
            }
            NoiseModel::Uniform { low_ns, high_ns } => {
                if low_ns.is_finite() && high_ns.is_finite() && low_ns <= high_ns {
                    Ok(())
                } else {
                    Err(LabError::domain("uniform noise needs finite low <= high"))
                }
            }
        }
    }
}

/// Named leakage configuration. Immutable once attached to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakageProfile {
    /// Profile name, e.g. `vuln_50us`.
    pub name: String,
    /// Cost of processing one exponent bit.
    pub base_cost_ns: f64,
    /// Additional cost of one extra reduction.
    pub extra_reduction_ns: f64,
    /// Measurement noise.
    pub noise: NoiseModel,
    /// When false the extra reduction is free regardless of its cost.
    pub leak_enabled: bool,
}

impl Default for LeakageProfile {
    fn default() -> Self {
        Self::vulnerable_us("vuln_50us", 50.0)
    }
}

impl LeakageProfile {
    /// Profile with the default base cost, no leak and no noise.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_cost_ns: DEFAULT_BASE_COST_NS,
            extra_reduction_ns: 0.0,
            noise: NoiseModel::None,
            leak_enabled: true,
        }
    }

    /// Leaking profile with default Gaussian noise.
    pub fn vulnerable_us(name: impl Into<String>, extra_reduction_us: f64) -> Self {
        Self::new(name)
            .extra_reduction_us(extra_reduction_us)
            .noise(NoiseModel::Gaussian {
                sigma_ns: DEFAULT_NOISE_SIGMA_NS,
            })
    }

    /// Negative control: extra reductions cost nothing.
    pub fn no_leak() -> Self {
        Self::new("no_leak")
            .noise(NoiseModel::Gaussian {
                sigma_ns: DEFAULT_NOISE_SIGMA_NS,
            })
            .leak_enabled(false)
    }

    /// Look up a named preset.
    pub fn preset(name: &str) -> Result<Self> {
        PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, build)| build())
            .ok_or_else(|| LabError::UnknownConfiguration {
                kind: "profile",
                name: name.to_string(),
            })
    }

    /// Names of all presets.
    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(name, _)| *name)
    }

    /// Set the per-bit base cost in nanoseconds.
    pub fn base_cost_ns(mut self, ns: f64) -> Self {
        self.base_cost_ns = ns;
        self
    }

    /// Set the extra-reduction cost in nanoseconds.
    pub fn extra_reduction_ns(mut self, ns: f64) -> Self {
        self.extra_reduction_ns = ns;
        self
    }

    /// Set the extra-reduction cost in microseconds.
    pub fn extra_reduction_us(self, us: f64) -> Self {
        self.extra_reduction_ns(us * NS_PER_US)
    }

    /// Set the noise model.
    pub fn noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    /// Gaussian noise with standard deviation in microseconds.
    pub fn gaussian_noise_us(self, sigma_us: f64) -> Self {
        self.noise(NoiseModel::Gaussian {
            sigma_ns: sigma_us * NS_PER_US,
        })
    }

    /// Enable or disable the leak.
    pub fn leak_enabled(mut self, enabled: bool) -> Self {
        self.leak_enabled = enabled;
        self
    }

    /// Cost actually charged per extra reduction.
    pub fn effective_extra_ns(&self) -> f64 {
        if self.leak_enabled {
            self.extra_reduction_ns
        } else {
            0.0
        }
    }

    /// Whether timing depends on the extra-reduction events at all.
    pub fn leaks(&self) -> bool {
        self.effective_extra_ns() > 0.0
    }

    /// Check costs and noise parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_cost_ns.is_finite() && self.base_cost_ns >= 0.0) {
            return Err(LabError::domain("base cost must be finite and >= 0"));
        }
        if !(self.extra_reduction_ns.is_finite() && self.extra_reduction_ns >= 0.0) {
            return Err(LabError::domain("extra reduction cost must be finite and >= 0"));
        }
        self.noise.validate()
    }
}

type PresetFn = fn() -> LeakageProfile;

const PRESETS: &[(&str, PresetFn)] = &[
    ("vuln_0us", || LeakageProfile::vulnerable_us("vuln_0us", 0.0)),
    ("vuln_10us", || LeakageProfile::vulnerable_us("vuln_10us", 10.0)),
    ("vuln_50us", || LeakageProfile::vulnerable_us("vuln_50us", 50.0)),
    ("vuln_100us", || LeakageProfile::vulnerable_us("vuln_100us", 100.0)),
    ("no_leak", LeakageProfile::no_leak),
];
