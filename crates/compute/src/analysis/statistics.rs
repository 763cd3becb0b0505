pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }
}

/// Single-pass count/sum/min/max accumulator for per-pixel attribute values.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RunningStats {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl RunningStats {
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Mean of recorded values; 0 when nothing was recorded.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RunningStats, Statistics};

    #[test]
    fn mean_works() {
        let m = Statistics::mean(&[1.0, 2.0, 3.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9);
        assert_eq!(Statistics::min_max(&[4.0, -1.0, 2.0]), Some((-1.0, 4.0)));
        assert_eq!(Statistics::mean(&[]), None);
    }

    #[test]
    fn running_stats_track_min_max_sum_count() {
        let mut s = RunningStats::default();
        assert_eq!(s.mean(), 0.0);
        s.record(5.0);
        s.record(-2.0);
        s.record(7.0);
        assert_eq!(s.count, 3);
        assert_eq!(s.sum, 10.0);
        assert_eq!(s.min, -2.0);
        assert_eq!(s.max, 7.0);
    }
}
