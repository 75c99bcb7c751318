use crate::types::{ChartBounds, Sample};
/// Append-only sample history with a lazily captured time origin.
#[derive(Debug, Default, Clone)]
pub struct SampleStore {
    samples: Vec<Sample>,
    origin: Option<f64>,
}
impl SampleStore {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            origin: None,
        }
    }
    /// Appends a point. The first point after creation or `clear` fixes the origin.
    pub fn add_point(&mut self, timestamp: f64, value: f64) -> Sample {
        if self.samples.is_empty() {
            self.origin = Some(timestamp);
        }
        let origin = self.origin.unwrap_or(timestamp);
        let sample = Sample {
            elapsed: timestamp - origin,
            value,
        };
        self.samples.push(sample);
        sample
    }
    pub fn clear(&mut self) {
        self.samples.clear();
        self.origin = None;
    }
    pub fn snapshot(&self) -> &[Sample] {
        &self.samples
    }
    pub fn origin(&self) -> Option<f64> {
        self.origin
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn latest(&self) -> Option<Sample> {
        self.samples.last().copied()
    }
    pub fn bounds(&self) -> Option<ChartBounds> {
        chart_bounds(&self.samples)
    }
}
/// Autoscale ranges for a renderer.
///
/// X spans `0..=max(elapsed) + 1`. Y is padded by a tenth of the half-range,
/// or by a tenth of the extreme values themselves when the signal is flat.
pub fn chart_bounds(samples: &[Sample]) -> Option<ChartBounds> {
    let first = samples.first()?;
    let mut max_t = first.elapsed;
    let mut min_y = first.value;
    let mut max_y = first.value;
    for s in &samples[1..] {
        max_t = max_t.max(s.elapsed);
        min_y = min_y.min(s.value);
        max_y = max_y.max(s.value);
    }
    let half_range = (max_y - min_y) / 2.0;
    let y = if half_range == 0.0 {
        (min_y - min_y * 0.1, max_y + max_y * 0.1)
    } else {
        (min_y - half_range * 0.1, max_y + half_range * 0.1)
    };
    Some(ChartBounds {
        x: (0.0, max_t + 1.0),
        y,
    })
}
