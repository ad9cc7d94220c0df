//! Data Synthesizer Module
//! Produces the mock datasets behind each documentation chart.
//!
//! Categorical data is fixed. Time-indexed data is a sinusoid (or a flat
//! mean) plus normally distributed noise, clamped to the sensor's physical
//! range. The random source is injected so tests can seed it.

use crate::data::model::{
    AccuracyDataset, ClampRange, DataError, MemoryDataset, Metric, PerformanceDataset, PoolKind,
    ReliabilityDataset, ResourcePool, Sample, ScoredMetric, SensorDataset, SizeUnit, TimeSeries,
};
use chrono::{Duration, NaiveDateTime};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;
use std::f64::consts::PI;

/// Hours in the reliability window.
pub const RELIABILITY_HOURS: u32 = 24;
/// Samples in the multi-day simulation (4 days at 30 minute spacing).
pub const SIMULATION_SAMPLES: usize = 192;
pub const SIMULATION_SPACING_MINUTES: i64 = 30;

/// Independent per-slot noise around a fixed mean.
#[derive(Debug, Clone, Copy)]
pub struct NoiseProfile {
    pub name: &'static str,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub const SUCCESS_RATE: NoiseProfile = NoiseProfile {
    name: "Success Rate",
    mean: 98.5,
    std_dev: 1.5,
    min: 95.0,
    max: 100.0,
};

pub const RESPONSE_TIME: NoiseProfile = NoiseProfile {
    name: "Response Time",
    mean: 3.2,
    std_dev: 0.8,
    min: 1.5,
    max: 6.0,
};

/// Periodic signal: `baseline + amplitude * sin(2πi / period) + N(0, σ)`.
#[derive(Debug, Clone, Copy)]
pub struct SignalProfile {
    pub name: &'static str,
    pub baseline: f64,
    pub amplitude: f64,
    pub period_samples: f64,
    pub noise_std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub const WATER_TEMP: SignalProfile = SignalProfile {
    name: "Water Temp",
    baseline: 24.5,
    amplitude: 2.0,
    period_samples: 24.0,
    noise_std_dev: 0.3,
    min: 20.0,
    max: 30.0,
};

pub const PH_LEVEL: SignalProfile = SignalProfile {
    name: "pH",
    baseline: 7.2,
    amplitude: 0.3,
    period_samples: 24.0,
    noise_std_dev: 0.1,
    min: 6.5,
    max: 8.0,
};

pub const TURBIDITY: SignalProfile = SignalProfile {
    name: "Turbidity",
    baseline: 15.0,
    amplitude: 5.0,
    period_samples: 72.0,
    noise_std_dev: 2.0,
    min: 5.0,
    max: 25.0,
};

/// Declared flash capacity on the module datasheet. The partition table
/// only accounts for 4000KB (1200 used + 2800 free).
pub const FLASH_DECLARED_KB: u32 = 4096;

/// Generates one dataset per chart type.
pub struct DataSynthesizer<R: Rng> {
    rng: R,
}

impl DataSynthesizer<StdRng> {
    /// Unseeded generator for production runs.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator.
    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DataSynthesizer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Declared accuracy of every on-board sensor.
    pub fn sensor_accuracy(&self) -> AccuracyDataset {
        AccuracyDataset {
            metrics: vec![
                Metric::new("Water Temp", 0.3, "±°C"),
                Metric::new("pH", 0.15, "±pH"),
                Metric::new("Turbidity", 3.0, "±%"),
                Metric::new("Air Temp", 0.5, "±°C"),
                Metric::new("Humidity", 3.0, "±%RH"),
                Metric::new("DO", 0.1, "±mg/L"),
                Metric::new("Ammonia", 1.0, "±ppm"),
            ],
        }
    }

    /// Normalized scores for visual comparison plus the literal measurements.
    pub fn system_performance(&self) -> PerformanceDataset {
        PerformanceDataset {
            metrics: vec![
                ScoredMetric::new("Boot Time", 3.0, "3s"),
                ScoredMetric::new("WiFi Connect", 10.0, "5-15s"),
                ScoredMetric::new("Sensor Cycle", 30.0, "30s"),
                ScoredMetric::new("HTTP Request", 3.5, "2-5s"),
                ScoredMetric::new("Memory Usage", 35.0, "180KB/512KB"),
                ScoredMetric::new("Flash Usage", 30.0, "1.2MB/4MB"),
            ],
        }
    }

    /// 24 hourly samples of transmission success rate and HTTP response time.
    pub fn network_reliability(&mut self) -> Result<ReliabilityDataset, DataError> {
        let success_rate = self.hourly_series(&SUCCESS_RATE)?;
        let response_time = self.hourly_series(&RESPONSE_TIME)?;
        ReliabilityDataset::new(success_rate, response_time)
    }

    /// Four days of water temperature, pH and turbidity readings ending at
    /// `anchor`, one sample every 30 minutes.
    pub fn sensor_simulation(&mut self, anchor: NaiveDateTime) -> Result<SensorDataset, DataError> {
        let spacing = Duration::minutes(SIMULATION_SPACING_MINUTES);
        let start = anchor - spacing * SIMULATION_SAMPLES as i32;
        let timestamps: Vec<NaiveDateTime> = (0..SIMULATION_SAMPLES)
            .map(|i| start + spacing * i as i32)
            .collect();

        let water_temp = self.periodic_series(&WATER_TEMP, &timestamps)?;
        let ph = self.periodic_series(&PH_LEVEL, &timestamps)?;
        let turbidity = self.periodic_series(&TURBIDITY, &timestamps)?;

        SensorDataset::new(water_temp, ph, turbidity)
    }

    /// RAM and flash partition snapshot.
    pub fn memory_usage(&self) -> Result<MemoryDataset, DataError> {
        let ram = ResourcePool::new(PoolKind::Ram, "RAM", 180, 512, SizeUnit::Kilobytes)?;
        let flash = ResourcePool::new(PoolKind::Flash, "Flash", 1200, 4000, SizeUnit::Megabytes)?
            .with_declared_capacity(FLASH_DECLARED_KB);

        for pool in [&ram, &flash] {
            if pool.capacity_mismatch() {
                tracing::warn!(
                    pool = pool.name(),
                    declared_kb = pool.declared_kb(),
                    partitioned_kb = pool.total_kb(),
                    "declared capacity differs from used + available"
                );
            }
        }

        Ok(MemoryDataset { ram, flash })
    }

    fn hourly_series(&mut self, profile: &NoiseProfile) -> Result<TimeSeries<u32>, DataError> {
        let range = ClampRange::new(profile.min, profile.max)?;
        let noise = Normal::new(profile.mean, profile.std_dev)?;

        let samples = (0..RELIABILITY_HOURS)
            .map(|hour| Sample {
                timestamp: hour,
                value: range.clamp(noise.sample(&mut self.rng)),
            })
            .collect();

        TimeSeries::new(profile.name, range, samples)
    }

    fn periodic_series(
        &mut self,
        profile: &SignalProfile,
        timestamps: &[NaiveDateTime],
    ) -> Result<TimeSeries<NaiveDateTime>, DataError> {
        let range = ClampRange::new(profile.min, profile.max)?;
        let noise = Normal::new(0.0, profile.noise_std_dev)?;

        let samples = timestamps
            .iter()
            .enumerate()
            .map(|(i, &timestamp)| {
                let phase = 2.0 * PI * i as f64 / profile.period_samples;
                let signal = profile.baseline + profile.amplitude * phase.sin();
                Sample {
                    timestamp,
                    value: range.clamp(signal + noise.sample(&mut self.rng)),
                }
            })
            .collect();

        TimeSeries::new(profile.name, range, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_accuracy_categories_in_order() {
        let data = DataSynthesizer::seeded(1).sensor_accuracy();
        let names: Vec<&str> = data.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            ["Water Temp", "pH", "Turbidity", "Air Temp", "Humidity", "DO", "Ammonia"]
        );
        let labels: Vec<String> = data.metrics.iter().map(Metric::label).collect();
        assert_eq!(
            labels,
            ["0.3±°C", "0.15±pH", "3.0±%", "0.5±°C", "3.0±%RH", "0.1±mg/L", "1.0±ppm"]
        );
        assert!(data.metrics.iter().all(|m| m.value >= 0.0));
    }

    #[test]
    fn test_performance_shows_literal_values() {
        let data = DataSynthesizer::seeded(1).system_performance();
        assert_eq!(data.metrics.len(), 6);
        assert_eq!(data.metrics[1].actual, "5-15s");
        assert_eq!(data.metrics[4].actual, "180KB/512KB");
    }

    #[test]
    fn test_reliability_samples_stay_in_bounds() {
        for seed in 0..200 {
            let data = DataSynthesizer::seeded(seed).network_reliability().unwrap();
            assert_eq!(data.success_rate.len(), 24);
            assert_eq!(data.response_time.len(), 24);
            assert!(data.success_rate.values().all(|v| (95.0..=100.0).contains(&v)));
            assert!(data.response_time.values().all(|v| (1.5..=6.0).contains(&v)));
        }
    }

    #[test]
    fn test_reliability_hours_span_the_day() {
        let data = DataSynthesizer::seeded(7).network_reliability().unwrap();
        let hours: Vec<u32> = data.success_rate.samples().iter().map(|s| s.timestamp).collect();
        assert_eq!(hours, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_simulation_samples_stay_in_bounds() {
        for seed in 0..50 {
            let data = DataSynthesizer::seeded(seed).sensor_simulation(anchor()).unwrap();
            assert!(data.water_temp.values().all(|v| (20.0..=30.0).contains(&v)));
            assert!(data.ph.values().all(|v| (6.5..=8.0).contains(&v)));
            assert!(data.turbidity.values().all(|v| (5.0..=25.0).contains(&v)));
        }
    }

    #[test]
    fn test_simulation_time_base() {
        let data = DataSynthesizer::seeded(3).sensor_simulation(anchor()).unwrap();
        for series in data.series() {
            assert_eq!(series.len(), SIMULATION_SAMPLES);
        }
        let samples = data.water_temp.samples();
        assert!(samples
            .windows(2)
            .all(|w| w[1].timestamp - w[0].timestamp == Duration::minutes(30)));
        assert_eq!(
            data.water_temp.first_timestamp(),
            Some(anchor() - Duration::hours(96))
        );
        assert_eq!(
            data.water_temp.last_timestamp(),
            Some(anchor() - Duration::minutes(30))
        );
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = DataSynthesizer::seeded(42).sensor_simulation(anchor()).unwrap();
        let b = DataSynthesizer::seeded(42).sensor_simulation(anchor()).unwrap();
        assert!(a.turbidity.values().eq(b.turbidity.values()));

        let c = DataSynthesizer::seeded(42).network_reliability().unwrap();
        let d = DataSynthesizer::seeded(42).network_reliability().unwrap();
        assert!(c.response_time.values().eq(d.response_time.values()));
    }

    #[test]
    fn test_memory_pools_balance() {
        let data = DataSynthesizer::seeded(1).memory_usage().unwrap();
        for pool in data.pools() {
            assert_eq!(pool.used_kb() + pool.available_kb(), pool.total_kb());
            assert_eq!(pool.wedges().iter().sum::<f64>(), pool.total_kb() as f64);
        }
        assert_eq!(data.ram.total_kb(), 512);
        assert_eq!(data.flash.total_kb(), 4000);
        assert_eq!(data.flash.declared_kb(), FLASH_DECLARED_KB);
        assert_eq!(data.ram.wedge_labels(), ["Used (180KB)", "Available (332KB)"]);
        assert_eq!(data.flash.wedge_labels(), ["Used (1.2MB)", "Available (2.8MB)"]);
    }
}
