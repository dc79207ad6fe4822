//! Integer progress reporting
//!
//! Converts fractional job progress into whole percentages and forwards a
//! value only when it exceeds the last reported one.

/// Rate-limited percent sink
pub struct ProgressTracker<F: FnMut(u8)> {
    sink: F,
    last: u8,
}

impl<F: FnMut(u8)> ProgressTracker<F> {
    /// Wrap a sink; nothing is reported until the first increase over 0
    pub fn new(sink: F) -> Self {
        Self { sink, last: 0 }
    }

    /// Report `fraction` of the job as done
    pub fn update(&mut self, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).ceil() as u8;
        if percent > self.last {
            self.last = percent;
            (self.sink)(percent);
        }
    }

    /// Last percentage forwarded to the sink
    pub fn last(&self) -> u8 {
        self.last
    }
}

/// Job fraction after `within` of color `color_idx` in cluster `cluster_idx`
///
/// Each cluster owns an equal share of the job and each color an equal
/// share of its cluster.
pub fn job_fraction(
    cluster_idx: usize,
    n_clusters: usize,
    color_idx: usize,
    n_colors: usize,
    within: f64,
) -> f64 {
    let n_clusters = n_clusters.max(1) as f64;
    let n_colors = n_colors.max(1) as f64;
    (cluster_idx as f64 + (color_idx as f64 + within) / n_colors) / n_clusters
}
