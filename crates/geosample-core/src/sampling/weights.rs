/// Normalized cumulative distribution over a set of areas
#[derive(Debug, Clone, PartialEq)]
pub struct AreaWeights {
    cumulative: Vec<f64>,
    total: f64,
}

impl AreaWeights {
    /// Build from raw areas; `None` if any area is negative or non-finite,
    /// or if they sum to zero
    pub fn new(areas: &[f64]) -> Option<Self> {
        if areas.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return None;
        }

        let total: f64 = areas.iter().sum();
        if !(total > 0.0) {
            return None;
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = areas
            .iter()
            .map(|area| {
                running += area;
                running / total
            })
            .collect();

        // Guard against rounding leaving the last bucket short of 1
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Some(Self { cumulative, total })
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Sum of the raw areas
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Fraction of the total held by entry `index`
    pub fn share(&self, index: usize) -> f64 {
        let upper = self.cumulative[index];
        let lower = if index == 0 { 0.0 } else { self.cumulative[index - 1] };
        upper - lower
    }

    /// Inverse-CDF lookup for a uniform draw `u` in `[0, 1)`
    pub fn select(&self, u: f64) -> usize {
        self.cumulative.partition_point(|&c| c <= u).min(self.cumulative.len() - 1)
    }

    /// Split `total` across entries as `round(total * share)` each
    pub fn quotas(&self, total: usize) -> Vec<usize> {
        (0..self.len()).map(|i| (total as f64 * self.share(i)).round() as usize).collect()
    }
}
