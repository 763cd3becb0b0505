/// Tunables shared by the attribute transforms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttributeParams {
    /// Vertical window (samples) for RMS and max-magnitude.
    pub window_size: usize,
    pub sample_rate_ms: f64,
    /// Horizontal distance between adjacent traces, metres.
    pub trace_spacing_m: f64,
    /// Constant interval velocity used to turn time samples into depth.
    /// Not calibrated to any velocity model.
    pub velocity_mps: f64,
}

impl Default for AttributeParams {
    fn default() -> Self {
        Self {
            window_size: 25,
            sample_rate_ms: 4.0,
            trace_spacing_m: 25.0,
            velocity_mps: 2000.0,
        }
    }
}

impl AttributeParams {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate_ms: f64) -> Self {
        self.sample_rate_ms = sample_rate_ms;
        self
    }

    /// Equivalent depth of one time sample: `sample_rate * velocity / 1000`.
    pub fn depth_per_sample_m(&self) -> f64 {
        self.sample_rate_ms * self.velocity_mps / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeParams;

    #[test]
    fn default_depth_per_sample() {
        assert_eq!(AttributeParams::default().depth_per_sample_m(), 8.0);
        let p = AttributeParams {
            velocity_mps: 3000.0,
            ..AttributeParams::default()
        };
        assert_eq!(p.depth_per_sample_m(), 12.0);
    }
}
