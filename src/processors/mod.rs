pub mod grid_processor;
pub mod warmth_index;

pub use grid_processor::{GridProcessor, GridRun, NoDataReason, PointStatus};
pub use warmth_index::{compute_index, yearly_index, YearPolicy};
