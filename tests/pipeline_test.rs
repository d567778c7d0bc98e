//! End-to-end runs with a real file system and a mocked intake

use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xcdog::classification::BuildCategory;
use xcdog::discovery::{LogDiscovery, ManualClock};
use xcdog::facts::{EnvXcodeFacts, HostFactsError, HostFactsFetcher};
use xcdog::fs::RealFileSystem;
use xcdog::metrics::SystemInfo;
use xcdog::parser::{parse_json_tree, BuildStepRecord, LogParser, ParseError};
use xcdog::pipeline::{
    PipelineContext, PipelineError, PipelineOrchestrator, RunRequest, UploadStatus,
};
use xcdog::upload::{Credentials, DatadogUploader};

const REPORT: &str = include_str!("fixtures/xclogparser_report.json");

struct FixtureParser;

impl LogParser for FixtureParser {
    fn parse(&self, log: &Path) -> Result<Vec<BuildStepRecord>, ParseError> {
        assert!(log.exists(), "parser received a missing log: {}", log.display());
        parse_json_tree(REPORT)
    }
}

struct FixedHostFacts;

impl HostFactsFetcher for FixedHostFacts {
    fn fetch(&self) -> Result<SystemInfo, HostFactsError> {
        Ok(SystemInfo {
            cpu_count: 4,
            cpu_model: "Intel(R) Core(TM) i7".to_string(),
            cpu_speed_ghz: 2.6,
            host_architecture: "x86_64".to_string(),
            host_model: "VMware7,1".to_string(),
            host_os: "macOS".to_string(),
            host_os_family: "Darwin".to_string(),
            host_os_version: "13.6".to_string(),
            is_virtual: true,
            memory_free_mb: 1024.0,
            memory_total_mb: 8192.0,
            swap_free_mb: 512.0,
            swap_total_mb: 1024.0,
            timezone: "+00:00".to_string(),
            uptime_seconds: 120,
        })
    }
}

struct Workspace {
    _dir: TempDir,
    build_dir: PathBuf,
}

fn start() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

fn workspace(with_log: bool) -> Workspace {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("App-abcdef");
    let build_dir = project.join("Build/Products");
    fs::create_dir_all(&build_dir).unwrap();
    fs::create_dir_all(project.join("Logs/Build")).unwrap();

    if with_log {
        let log = project.join("Logs/Build/7A3F.xcactivitylog");
        fs::write(&log, b"SLF0").unwrap();
        filetime::set_file_mtime(&log, filetime::FileTime::from_system_time(start())).unwrap();
    }

    Workspace {
        _dir: dir,
        build_dir,
    }
}

fn orchestrator(intake_url: String) -> PipelineOrchestrator {
    let discovery = LogDiscovery::new(
        Arc::new(RealFileSystem::new()),
        Arc::new(ManualClock::new(start())),
    );
    let xcode = [
        ("XCODE_PRODUCT_BUILD_VERSION", "15E204a"),
        ("XCODE_VERSION_ACTUAL", "1530"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let context = PipelineContext::new(
        discovery,
        Arc::new(FixtureParser),
        Arc::new(FixedHostFacts),
        Arc::new(EnvXcodeFacts::from_map(xcode)),
        Arc::new(DatadogUploader::new(intake_url, Duration::from_secs(5)).unwrap()),
    );
    PipelineOrchestrator::new(context)
}

fn request(build_dir: &Path) -> RunRequest {
    let mut request = RunRequest::new(build_dir, 2, Credentials::new("api-key", "app-key"));
    request.is_ci = true;
    request.hostname = "ci-runner-7".to_string();
    request.project_name = Some("App".to_string());
    request
}

#[tokio::test]
async fn test_full_run_delivers_metrics() {
    let workspace = workspace(true);
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/logs"))
        .and(header("DD-API-KEY", "api-key"))
        .and(header("DD-APPLICATION-KEY", "app-key"))
        .and(body_partial_json(json!({
            "hostname": "ci-runner-7",
            "service": "App",
            "message": {
                "buildCategory": "incremental",
                "isCI": true,
                "totalElapsedBuildTimeMs": 63250,
                "systemInfo": { "isVirtual": true, "hostModel": "VMware7,1" },
                "xcodeVersion": { "buildNumber": "15E204a", "version": "1530" }
            }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = orchestrator(format!("{}/api/v2/logs", mock_server.uri()))
        .execute(&request(&workspace.build_dir))
        .await
        .unwrap();

    assert_eq!(outcome.upload, UploadStatus::Delivered);
    assert_eq!(outcome.metrics.build_category(), BuildCategory::Incremental);
    assert_eq!(outcome.categorisation.build_compiled_count, 5);
    assert_eq!(outcome.dropped_steps, 1);
    assert!(outcome.log_path.ends_with("7A3F.xcactivitylog"));
}

#[tokio::test]
async fn test_rejected_upload_still_returns_metrics() {
    let workspace = workspace(true);
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let outcome = orchestrator(format!("{}/api/v2/logs", mock_server.uri()))
        .execute(&request(&workspace.build_dir))
        .await
        .unwrap();

    assert!(matches!(outcome.upload, UploadStatus::Failed(_)));
    assert_eq!(outcome.metrics.total_elapsed_build_time_ms(), 63250);
}

#[tokio::test]
async fn test_missing_log_fails_without_uploading() {
    let workspace = workspace(false);
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = orchestrator(format!("{}/api/v2/logs", mock_server.uri()))
        .execute(&request(&workspace.build_dir))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Discovery(_)));
}
