use std::env;

use compute::AttributeParams;

pub const ENV_WINDOW_SIZE: &str = "SEIS_WINDOW_SIZE";
pub const ENV_VELOCITY_MPS: &str = "SEIS_VELOCITY_MPS";
pub const ENV_TRACE_SPACING_M: &str = "SEIS_TRACE_SPACING_M";
pub const ENV_SEED: &str = "SEIS_SEED";

fn env_var_usize(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_var_u64(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_var_f64(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

/// Defaults taken from the environment; command-line flags override them.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub window_size: usize,
    pub velocity_mps: f64,
    pub trace_spacing_m: f64,
    pub seed: u64,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    /// Unparseable or non-positive values fall back to the defaults.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = AttributeParams::default();
        Self {
            window_size: env_var_usize(lookup, ENV_WINDOW_SIZE, defaults.window_size),
            velocity_mps: env_var_f64(lookup, ENV_VELOCITY_MPS, defaults.velocity_mps),
            trace_spacing_m: env_var_f64(lookup, ENV_TRACE_SPACING_M, defaults.trace_spacing_m),
            seed: env_var_u64(lookup, ENV_SEED, 0),
        }
    }

    pub fn attribute_params(&self, sample_rate_ms: f64) -> AttributeParams {
        AttributeParams {
            window_size: self.window_size,
            sample_rate_ms,
            trace_spacing_m: self.trace_spacing_m,
            velocity_mps: self.velocity_mps,
        }
    }
}
