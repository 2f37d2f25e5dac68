//! Volume spike: last bar volume against the mean of the bars before it.

use super::Rule;
use crate::domain::BarSeries;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub last_volume: f64,
    /// Mean volume of the `window` bars preceding the last bar.
    pub average_volume: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone)]
pub struct VolumeSpikeRule {
    pub window: usize,
    pub multiplier: f64,
}

impl VolumeSpikeRule {
    pub fn new(window: usize, multiplier: f64) -> Self {
        Self { window, multiplier }
    }

    /// Volume stats at the last bar, `None` on short series or a zero average.
    pub fn stats(&self, series: &BarSeries) -> Option<VolumeStats> {
        if self.window == 0 || series.len() < self.min_bars() {
            return None;
        }
        let volumes = series.volumes();
        let n = volumes.len();
        let last_volume = volumes[n - 1];
        let prior = &volumes[n - 1 - self.window..n - 1];
        let average_volume = prior.iter().sum::<f64>() / self.window as f64;
        if average_volume <= 0.0 {
            return None;
        }
        Some(VolumeStats {
            last_volume,
            average_volume,
            ratio: last_volume / average_volume,
        })
    }

    pub fn is_spike(&self, stats: &VolumeStats) -> bool {
        stats.last_volume > self.multiplier * stats.average_volume
    }
}

impl Rule for VolumeSpikeRule {
    type Hit = VolumeStats;

    fn name(&self) -> &str {
        "volume_spike"
    }

    fn min_bars(&self) -> usize {
        self.window + 2
    }

    fn evaluate(&self, series: &BarSeries) -> Option<VolumeStats> {
        self.stats(series).filter(|stats| self.is_spike(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BarSeries, Timeframe};
    use crate::rules::test_bars::bar;

    fn with_volumes(volumes: &[u64]) -> BarSeries {
        let bars = volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| bar(Timeframe::FourHour, i, 100.0, 100.0, v))
            .collect();
        BarSeries::new("TEST.IS", Timeframe::FourHour, bars).unwrap()
    }

    fn rule() -> VolumeSpikeRule {
        VolumeSpikeRule::new(20, 1.7)
    }

    #[test]
    fn spike_at_double_volume() {
        let mut volumes = vec![1000; 25];
        volumes.push(2000);
        let stats = rule().evaluate(&with_volumes(&volumes)).unwrap();
        assert_eq!(stats.average_volume, 1000.0);
        assert_eq!(stats.ratio, 2.0);
    }

    #[test]
    fn last_bar_excluded_from_average() {
        // 21 bars of 1000 then a huge bar: the average stays at 1000.
        let mut volumes = vec![1000; 21];
        volumes.push(100_000);
        let stats = rule().stats(&with_volumes(&volumes)).unwrap();
        assert_eq!(stats.average_volume, 1000.0);
    }

    #[test]
    fn below_multiplier_is_not_spike() {
        let mut volumes = vec![1000; 25];
        volumes.push(1700);
        let series = with_volumes(&volumes);
        assert!(rule().stats(&series).is_some());
        assert!(rule().evaluate(&series).is_none());
    }

    #[test]
    fn needs_22_bars() {
        let mut volumes = vec![1000; 20];
        volumes.push(5000);
        assert_eq!(volumes.len(), 21);
        assert!(rule().evaluate(&with_volumes(&volumes)).is_none());
    }

    #[test]
    fn zero_average_never_fires() {
        let mut volumes = vec![0; 25];
        volumes.push(5000);
        assert!(rule().evaluate(&with_volumes(&volumes)).is_none());
    }
}
