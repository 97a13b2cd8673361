pub mod constants;
pub mod coordinates;
pub mod progress;

pub use constants::*;
pub use coordinates::{inclusive_steps, round_tenth};
pub use progress::{ProgressObserver, ProgressReporter, ProgressSnapshot};
