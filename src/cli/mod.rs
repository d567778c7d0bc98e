pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, FactsArgs, LocateArgs, ReportArgs};
pub use output::{OutputFormat, OutputFormatter};
