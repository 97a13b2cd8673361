pub mod args;
pub mod commands;

pub use args::{Cli, Commands, RunOverrides};
pub use commands::run;
