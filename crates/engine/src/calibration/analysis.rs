/// Per-channel statistics persisted as the calibration artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelStats {
    pub low_avg: f64,
    pub high_avg: f64,
    pub low_std_dev: f64,
    pub high_std_dev: f64,
}

impl ChannelStats {
    pub fn low_threshold(&self) -> f64 {
        self.low_avg + 2.0 * self.low_std_dev
    }

    pub fn high_threshold(&self) -> f64 {
        self.high_avg - 2.0 * self.high_std_dev
    }
}

/// Splits `samples` around the median of the distinct values and summarises
/// each side.
///
/// The split point is the middle element of the sorted *distinct* values, not
/// the median of the raw samples. Samples below it are "low", the rest are
/// "high". An empty side reports zero mean and deviation.
pub fn analyze(samples: &[u32]) -> ChannelStats {
    if samples.is_empty() {
        return ChannelStats::default();
    }

    let mut distinct = samples.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let median = distinct[distinct.len() / 2];

    let (low_avg, low_std_dev) = mean_and_std_dev(samples.iter().filter(|&&s| s < median));
    let (high_avg, high_std_dev) = mean_and_std_dev(samples.iter().filter(|&&s| s >= median));

    ChannelStats {
        low_avg,
        high_avg,
        low_std_dev,
        high_std_dev,
    }
}

fn mean_and_std_dev<'a>(group: impl Iterator<Item = &'a u32> + Clone) -> (f64, f64) {
    let (count, sum) = group
        .clone()
        .fold((0usize, 0.0f64), |(count, sum), &s| (count + 1, sum + f64::from(s)));
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let squared = group.fold(0.0f64, |acc, &s| {
        let diff = f64::from(s) - mean;
        acc + diff * diff
    });
    (mean, (squared / count as f64).sqrt())
}
