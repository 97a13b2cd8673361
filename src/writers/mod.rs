pub mod dataset_writer;
pub mod failure_log;

pub use dataset_writer::DatasetWriter;
pub use failure_log::FailureLog;
