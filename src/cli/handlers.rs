//! Subcommand handlers. Each returns the process exit code.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use super::commands::{FactsArgs, LocateArgs, ReportArgs};
use super::output::OutputFormatter;
use crate::config::{ConfigError, XcdogConfig};
use crate::discovery::{LogDiscovery, SystemClock};
use crate::facts::{
    local_host_name, EnvXcodeFacts, HostFactsFetcher, SysinfoHostFacts, XcodeVersionSource,
};
use crate::fs::RealFileSystem;
use crate::pipeline::{PipelineContext, PipelineOrchestrator, RunRequest};
use crate::progress::LoggingHandler;
use crate::upload::Credentials;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Environment config with the command-line timeout applied on top
fn load_config(timeout: Option<u64>) -> Result<XcdogConfig, ConfigError> {
    let mut config = XcdogConfig::default();
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }
    config.validate()?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

fn report_failure(err: &anyhow::Error) -> i32 {
    error!("{:#}", err);
    eprintln!("Error: {:#}", err);
    EXIT_FAILURE
}

pub async fn handle_report(args: &ReportArgs) -> i32 {
    let config = match load_config(args.timeout) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    match run_report(args, &config).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_failure(&e),
    }
}

async fn run_report(args: &ReportArgs, config: &XcdogConfig) -> Result<()> {
    let start = Instant::now();
    let hostname = args.hostname.clone().unwrap_or_else(local_host_name);

    let context = PipelineContext::from_config(config, &hostname)
        .context("Failed to set up metrics upload")?;
    let orchestrator = PipelineOrchestrator::new(context).with_progress(Arc::new(LoggingHandler));

    let request = RunRequest {
        build_dir: args.build_dir.clone(),
        timeout_secs: config.timeout_secs,
        is_ci: args.ci,
        hostname,
        project_name: args.project_name.clone(),
        credentials: Credentials::new(&args.api_key, &args.application_key),
        dry_run: args.dry_run,
    };

    let outcome = orchestrator
        .execute(&request)
        .await
        .context("Failed to collect build metrics")?;

    let formatter = OutputFormatter::new(args.format.into());
    println!("{}", formatter.format_report(&outcome)?);
    eprintln!("Took {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

pub async fn handle_locate(args: &LocateArgs) -> i32 {
    let config = match load_config(args.timeout) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    match locate(&args.build_dir, config.timeout_secs).await {
        Ok(path) => {
            println!("{}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

async fn locate(build_dir: &Path, timeout_secs: u64) -> Result<PathBuf> {
    let discovery = LogDiscovery::new(Arc::new(RealFileSystem::new()), Arc::new(SystemClock));
    let build_dir = build_dir.to_path_buf();

    let path = tokio::task::spawn_blocking(move || {
        discovery.locate_latest_log(&build_dir, timeout_secs)
    })
    .await
    .context("Log discovery task failed")??;

    Ok(path)
}

pub async fn handle_facts(args: &FactsArgs) -> i32 {
    let config = XcdogConfig::default();
    if args.show_config {
        if let Err(e) = config.validate() {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    }

    match print_facts(args, &config).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_failure(&e),
    }
}

async fn print_facts(args: &FactsArgs, config: &XcdogConfig) -> Result<()> {
    let system_info = tokio::task::spawn_blocking(|| SysinfoHostFacts.fetch())
        .await
        .context("Host facts task failed")?
        .context("Failed to collect host facts")?;
    let xcode_version = EnvXcodeFacts::from_env().fetch();

    let formatter = OutputFormatter::new(args.format.into());
    let output = formatter.format_facts(
        &system_info,
        xcode_version.as_ref(),
        args.show_config.then_some(config),
    )?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_load_config_applies_timeout_override() {
        env::remove_var("XCDOG_TIMEOUT");
        let config = load_config(Some(42)).unwrap();
        assert_eq!(config.timeout_secs, 42);
    }

    #[test]
    #[serial]
    fn test_load_config_rejects_zero_timeout() {
        assert!(load_config(Some(0)).is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_locate_missing_directory_fails_after_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let build_dir = dir.path().join("App-abc").join("Build").join("Products");

        let args = LocateArgs {
            build_dir,
            timeout: Some(1),
        };
        assert_eq!(handle_locate(&args).await, EXIT_FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn test_report_with_invalid_config_exits_with_config_error() {
        let args = ReportArgs {
            api_key: "api".to_string(),
            application_key: "app".to_string(),
            build_dir: PathBuf::from("/tmp/build"),
            timeout: Some(0),
            ci: false,
            project_name: None,
            hostname: None,
            dry_run: true,
            format: super::super::commands::OutputFormatArg::Json,
        };
        assert_eq!(handle_report(&args).await, EXIT_CONFIG_ERROR);
    }
}
