pub mod dataset;
pub mod grid;
pub mod series;
pub mod zone;

pub use dataset::{
    Dataset, DatasetMetadata, DatasetSummary, FailureRecord, GridRecord, YearSummary,
    YearlyResults,
};
pub use grid::{GridBounds, GridPoint, YearRange};
pub use series::{MonthlyTemperatureSeries, MonthlyTemps};
pub use zone::ClimateZone;
