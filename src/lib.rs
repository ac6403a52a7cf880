//! Roaming export statistics: load a VLR/HLR roaming CSV, aggregate it per
//! country and per operator, and describe the results as chart specs.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod load;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{count_by, sum_by, AggregateSeries, Measure, SeriesEntry};
pub use chart::{CategoryOrder, ChartBuilder, ChartKind, ChartSpec, PipelineProfile};
pub use config::{AppConfig, ColumnNames, Direction};
pub use dashboard::{Dashboard, DashboardView};
pub use error::{Result, RoamingError};
pub use load::{load_table, read_table, Table};
pub use pipeline::{roaming_in, roaming_out, run_batch, run_pipeline, ChartSet, Job};
