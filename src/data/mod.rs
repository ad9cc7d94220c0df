//! Data module - Synthetic dataset generation

mod model;
mod synthesizer;

pub use model::{
    AccuracyDataset, MemoryDataset, PerformanceDataset, PoolKind, ReliabilityDataset,
    SensorDataset, TimeSeries,
};
pub use synthesizer::DataSynthesizer;
