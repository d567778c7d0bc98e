use xcdog::cli::commands::{CliArgs, Commands};
use xcdog::cli::handlers::{handle_facts, handle_locate, handle_report};
use xcdog::util::{init_logging, parse_level, LoggingConfig};
use xcdog::{XcdogConfig, VERSION};

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args, &XcdogConfig::default());

    debug!("xcdog v{} starting", VERSION);
    debug!("Arguments: {:?}", redacted(&args));

    let exit_code = match &args.command {
        Commands::Report(report_args) => handle_report(report_args).await,
        Commands::Locate(locate_args) => handle_locate(locate_args).await,
        Commands::Facts(facts_args) => handle_facts(facts_args).await,
    };

    std::process::exit(exit_code);
}

/// `--log-level`, `-v` and `-q` override the configured level
fn init_logging_from_args(args: &CliArgs, config: &XcdogConfig) {
    let mut logging = LoggingConfig::from_config(config);
    if let Some(level_str) = &args.log_level {
        logging.level = level_or_default(level_str);
    } else if args.verbose {
        logging.level = Level::DEBUG;
    } else if args.quiet {
        logging.level = Level::ERROR;
    }

    init_logging(logging);
}

fn level_or_default(level_str: &str) -> Level {
    parse_level(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

/// Command line for debug logs, without the API keys
fn redacted(args: &CliArgs) -> String {
    match &args.command {
        Commands::Report(report) => format!(
            "report build_dir={} timeout={:?} ci={} project={:?} dry_run={}",
            report.build_dir.display(),
            report.timeout,
            report.ci,
            report.project_name,
            report.dry_run
        ),
        other => format!("{:?}", other),
    }
}
