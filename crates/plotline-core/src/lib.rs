//! Core presentation logic for Plotline.
//!
//! Everything in this crate is pure: the presenter takes already-fetched
//! sparse rows plus an explicit timezone and "now", and returns chart-ready
//! dense series. All I/O lives behind the [`source::SeriesSource`] trait,
//! implemented by the storage crates.

pub mod chart;
pub mod compare;
pub mod config;
pub mod event;
pub mod granularity;
pub mod interval;
pub mod range;
pub mod series;
pub mod source;
pub mod sparkline;
pub mod split;

pub use chart::{present, ChartRequest, ChartSeries};
pub use compare::{
    align_comparison, resolve_comparison_range, AlignedComparison, CompareMode, ComparisonMapping,
    ComparisonMetadata, ComparisonRange,
};
pub use granularity::Granularity;
pub use interval::Interval;
pub use range::DateRange;
pub use series::{materialize, DenseChartPoint, SparseRow};
pub use source::{Metric, SeriesSource};
pub use sparkline::{to_sparkline, SparklinePoint};
pub use split::{split_incomplete, IncompleteSplit};
