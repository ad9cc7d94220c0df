//! Data Model Module
//! Metrics, clamped time series and resource pools fed to the chart renderer.

use chrono::NaiveDateTime;
use statrs::distribution::NormalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Inverted clamp range: min {min} > max {max}")]
    InvertedRange { min: f64, max: f64 },
    #[error("Resource pool '{pool}' uses {used}KB of {total}KB")]
    Overcommitted { pool: String, used: u32, total: u32 },
    #[error("Series '{0}' has no samples")]
    EmptySeries(String),
    #[error("Series '{series}' has non-increasing timestamps at sample {index}")]
    NonIncreasingTimestamps { series: String, index: usize },
    #[error("Series '{series}' sample {index} = {value} lies outside [{min}, {max}]")]
    OutOfRange {
        series: String,
        index: usize,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Series '{left}' and '{right}' do not share a time base")]
    TimeBaseMismatch { left: String, right: String },
    #[error("Invalid noise distribution: {0}")]
    Distribution(#[from] NormalError),
}

/// Render a value the way a human would type it: `3.0`, `0.15`, `1.2`.
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

/// Inclusive physical bounds applied to every generated sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampRange {
    min: f64,
    max: f64,
}

impl ClampRange {
    pub fn new(min: f64, max: f64) -> Result<Self, DataError> {
        if min > max {
            return Err(DataError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A sensor with its declared accuracy, e.g. `0.3` `±°C`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl Metric {
    pub fn new(name: &str, value: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
        }
    }

    /// Value and unit as printed above the bar.
    pub fn label(&self) -> String {
        format!("{}{}", format_value(self.value), self.unit)
    }
}

/// A performance metric: the bar length is a normalized score, the
/// annotation is the literal measured value.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMetric {
    pub name: String,
    pub score: f64,
    pub actual: String,
}

impl ScoredMetric {
    pub fn new(name: &str, score: f64, actual: &str) -> Self {
        Self {
            name: name.to_string(),
            score,
            actual: actual.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub timestamp: T,
    pub value: f64,
}

/// Ordered samples with strictly increasing timestamps, all inside `range`.
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    name: String,
    range: ClampRange,
    samples: Vec<Sample<T>>,
}

impl<T: PartialOrd + Copy> TimeSeries<T> {
    pub fn new(name: &str, range: ClampRange, samples: Vec<Sample<T>>) -> Result<Self, DataError> {
        if samples.is_empty() {
            return Err(DataError::EmptySeries(name.to_string()));
        }
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(DataError::NonIncreasingTimestamps {
                    series: name.to_string(),
                    index: index + 1,
                });
            }
        }
        if let Some((index, sample)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !range.contains(s.value))
        {
            return Err(DataError::OutOfRange {
                series: name.to_string(),
                index,
                value: sample.value,
                min: range.min(),
                max: range.max(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            range,
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> ClampRange {
        self.range
    }

    #[cfg(test)]
    pub fn samples(&self) -> &[Sample<T>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    pub fn points(&self) -> impl Iterator<Item = (T, f64)> + '_ {
        self.samples.iter().map(|s| (s.timestamp, s.value))
    }

    pub fn first_timestamp(&self) -> Option<T> {
        self.samples.first().map(|s| s.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<T> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Fails unless `other` was sampled at exactly the same instants.
    pub fn ensure_time_base(&self, other: &TimeSeries<T>) -> Result<(), DataError> {
        let same = self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(&other.samples)
                .all(|(a, b)| a.timestamp == b.timestamp);
        if same {
            Ok(())
        } else {
            Err(DataError::TimeBaseMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            })
        }
    }
}

/// Unit used when printing a pool's wedge labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kilobytes,
    Megabytes,
}

impl SizeUnit {
    pub fn format(&self, kb: u32) -> String {
        match self {
            SizeUnit::Kilobytes => format!("{}KB", kb),
            SizeUnit::Megabytes => format!("{}MB", format_value(kb as f64 / 1000.0)),
        }
    }
}

/// Identity of a resource pool; drives the fixed "used" wedge color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Ram,
    Flash,
}

/// A fixed-size memory pool. `available` is always derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePool {
    kind: PoolKind,
    name: String,
    used_kb: u32,
    total_kb: u32,
    declared_kb: u32,
    unit: SizeUnit,
}

impl ResourcePool {
    pub fn new(
        kind: PoolKind,
        name: &str,
        used_kb: u32,
        total_kb: u32,
        unit: SizeUnit,
    ) -> Result<Self, DataError> {
        if used_kb > total_kb {
            return Err(DataError::Overcommitted {
                pool: name.to_string(),
                used: used_kb,
                total: total_kb,
            });
        }
        Ok(Self {
            kind,
            name: name.to_string(),
            used_kb,
            total_kb,
            declared_kb: total_kb,
            unit,
        })
    }

    /// Record the capacity printed on the datasheet when it differs from
    /// the partitioned total.
    pub fn with_declared_capacity(mut self, declared_kb: u32) -> Self {
        self.declared_kb = declared_kb;
        self
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn used_kb(&self) -> u32 {
        self.used_kb
    }

    pub fn total_kb(&self) -> u32 {
        self.total_kb
    }

    pub fn available_kb(&self) -> u32 {
        self.total_kb - self.used_kb
    }

    pub fn declared_kb(&self) -> u32 {
        self.declared_kb
    }

    pub fn capacity_mismatch(&self) -> bool {
        self.declared_kb != self.total_kb
    }

    /// Wedge sizes in draw order: used, then available.
    pub fn wedges(&self) -> [f64; 2] {
        [self.used_kb as f64, self.available_kb() as f64]
    }

    pub fn wedge_labels(&self) -> [String; 2] {
        [
            format!("Used ({})", self.unit.format(self.used_kb)),
            format!("Available ({})", self.unit.format(self.available_kb())),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct AccuracyDataset {
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone)]
pub struct PerformanceDataset {
    pub metrics: Vec<ScoredMetric>,
}

/// Hourly network statistics; both series share the hour-of-day time base.
#[derive(Debug, Clone)]
pub struct ReliabilityDataset {
    pub success_rate: TimeSeries<u32>,
    pub response_time: TimeSeries<u32>,
}

impl ReliabilityDataset {
    pub fn new(
        success_rate: TimeSeries<u32>,
        response_time: TimeSeries<u32>,
    ) -> Result<Self, DataError> {
        success_rate.ensure_time_base(&response_time)?;
        Ok(Self {
            success_rate,
            response_time,
        })
    }

    pub fn series(&self) -> [&TimeSeries<u32>; 2] {
        [&self.success_rate, &self.response_time]
    }
}

#[derive(Debug, Clone)]
pub struct SensorDataset {
    pub water_temp: TimeSeries<NaiveDateTime>,
    pub ph: TimeSeries<NaiveDateTime>,
    pub turbidity: TimeSeries<NaiveDateTime>,
}

impl SensorDataset {
    pub fn new(
        water_temp: TimeSeries<NaiveDateTime>,
        ph: TimeSeries<NaiveDateTime>,
        turbidity: TimeSeries<NaiveDateTime>,
    ) -> Result<Self, DataError> {
        water_temp.ensure_time_base(&ph)?;
        water_temp.ensure_time_base(&turbidity)?;
        Ok(Self {
            water_temp,
            ph,
            turbidity,
        })
    }

    pub fn series(&self) -> [&TimeSeries<NaiveDateTime>; 3] {
        [&self.water_temp, &self.ph, &self.turbidity]
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDataset {
    pub ram: ResourcePool,
    pub flash: ResourcePool,
}

impl MemoryDataset {
    pub fn pools(&self) -> [&ResourcePool; 2] {
        [&self.ram, &self.flash]
    }
}
