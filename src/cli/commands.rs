use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Xcode build metrics for Datadog
#[derive(Parser, Debug)]
#[command(
    name = "xcdog",
    about = "Collects Xcode build metrics and ships them to Datadog",
    version,
    long_about = "xcdog finds the build log Xcode just wrote, classifies the build as noop, \
                  incremental or clean, and uploads the result together with host facts to \
                  the Datadog logs intake. Run it from a post-build script phase."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Classify the latest build and upload its metrics",
        long_about = "Locates the newest build log for the build directory, classifies the \
                      build and uploads the metrics record.\n\n\
                      Examples:\n  \
                      xcdog report $DD_API_KEY $DD_APP_KEY\n  \
                      xcdog report $DD_API_KEY $DD_APP_KEY --ci --project-name App\n  \
                      xcdog report key app --build-dir ./Build/Products --dry-run --format json"
    )]
    Report(ReportArgs),

    #[command(
        about = "Print the path of the latest build log",
        long_about = "Runs log discovery only and prints the path it settles on.\n\n\
                      Examples:\n  \
                      xcdog locate --build-dir ~/Library/Developer/Xcode/DerivedData/App-abc/Build/Products"
    )]
    Locate(LocateArgs),

    #[command(about = "Print host and Xcode facts")]
    Facts(FactsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    #[arg(value_name = "API_KEY", help = "Datadog API key")]
    pub api_key: String,

    #[arg(value_name = "APPLICATION_KEY", help = "Datadog application key")]
    pub application_key: String,

    #[arg(
        long,
        env = "BUILD_DIR",
        value_name = "DIR",
        help = "Build products directory Xcode built into"
    )]
    pub build_dir: PathBuf,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Seconds to wait for a new build log (default from XCDOG_TIMEOUT)"
    )]
    pub timeout: Option<u64>,

    #[arg(long, help = "Mark the build as a CI build")]
    pub ci: bool,

    #[arg(long, value_name = "NAME", help = "Project name, sent as the log service")]
    pub project_name: Option<String>,

    #[arg(
        long,
        value_name = "HOST",
        help = "Hostname reported with the metrics (defaults to this machine)"
    )]
    pub hostname: Option<String>,

    #[arg(long, help = "Assemble metrics without uploading them")]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct LocateArgs {
    #[arg(
        long,
        env = "BUILD_DIR",
        value_name = "DIR",
        help = "Build products directory Xcode built into"
    )]
    pub build_dir: PathBuf,

    #[arg(long, value_name = "SECONDS", help = "Seconds to wait for a new build log")]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct FactsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Also print the effective configuration")]
    pub show_config: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
