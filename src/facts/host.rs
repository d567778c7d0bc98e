//! Host hardware and OS facts

use crate::metrics::SystemInfo;
use chrono::Local;
#[cfg(target_os = "macos")]
use std::process::Command;
use sysinfo::System;
use thiserror::Error;
use tracing::debug;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Model prefixes reported by common hypervisors
const VIRTUAL_MODEL_PREFIXES: &[&str] = &["VMware", "VirtualBox", "Parallels"];

#[derive(Error, Debug)]
pub enum HostFactsError {
    #[error("{0} not available on this host")]
    SystemInfoUnavailable(String),
}

pub trait HostFactsFetcher: Send + Sync {
    fn fetch(&self) -> Result<SystemInfo, HostFactsError>;
}

/// Collects host facts through `sysinfo`
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoHostFacts;

impl HostFactsFetcher for SysinfoHostFacts {
    fn fetch(&self) -> Result<SystemInfo, HostFactsError> {
        let mut sys = System::new_all();
        sys.refresh_all();

        let host_os = System::name().ok_or_else(|| {
            HostFactsError::SystemInfoUnavailable("Operating system name".to_string())
        })?;

        let cpus = sys.cpus();
        let cpu_model = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();
        let cpu_speed_ghz = cpus
            .iter()
            .map(|cpu| cpu.frequency())
            .max()
            .unwrap_or(0) as f32
            / 1000.0;

        let host_model = host_model();
        let info = SystemInfo {
            cpu_count: cpus.len(),
            cpu_model,
            cpu_speed_ghz,
            host_architecture: host_architecture().to_string(),
            is_virtual: is_virtual_model(&host_model),
            host_model,
            host_os,
            host_os_family: host_os_family().to_string(),
            host_os_version: System::os_version().unwrap_or_default(),
            memory_free_mb: bytes_to_mb(sys.free_memory()),
            memory_total_mb: bytes_to_mb(sys.total_memory()),
            swap_free_mb: bytes_to_mb(sys.free_swap()),
            swap_total_mb: bytes_to_mb(sys.total_swap()),
            timezone: Local::now().offset().to_string(),
            uptime_seconds: System::uptime(),
        };

        debug!(?info, "Collected host facts");
        Ok(info)
    }
}

/// Name of this machine, empty if unknown
pub fn local_host_name() -> String {
    System::host_name().unwrap_or_default()
}

fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

fn is_virtual_model(model: &str) -> bool {
    VIRTUAL_MODEL_PREFIXES
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

/// Architecture as `uname -m` spells it
fn host_architecture() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" if cfg!(target_os = "macos") => "arm64",
        arch => arch,
    }
}

fn host_os_family() -> &'static str {
    match std::env::consts::OS {
        "macos" | "ios" => "Darwin",
        "linux" => "Linux",
        "windows" => "Windows_NT",
        os => os,
    }
}

#[cfg(target_os = "macos")]
fn host_model() -> String {
    match Command::new("sysctl").args(["-n", "hw.model"]).output() {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        Ok(output) => {
            debug!(status = %output.status, "sysctl hw.model failed");
            String::new()
        }
        Err(e) => {
            debug!(error = %e, "Failed to run sysctl");
            String::new()
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn host_model() -> String {
    std::fs::read_to_string("/sys/devices/virtual/dmi/id/product_name")
        .map(|model| model.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_host_facts() {
        let info = SysinfoHostFacts.fetch().unwrap();

        assert!(info.cpu_count > 0);
        assert!(info.memory_total_mb > 0.0);
        assert!(info.memory_free_mb <= info.memory_total_mb);
        assert!(!info.host_os.is_empty());
        assert!(!info.host_architecture.is_empty());
        assert!(!info.timezone.is_empty());
    }

    #[test]
    fn test_virtual_models() {
        assert!(is_virtual_model("VMware7,1"));
        assert!(is_virtual_model("VirtualBox"));
        assert!(is_virtual_model("Parallels-ARM"));
        assert!(!is_virtual_model("MacBookPro18,3"));
        assert!(!is_virtual_model(""));
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(16 * 1024 * 1024 * 1024), 16384.0);
        assert_eq!(bytes_to_mb(0), 0.0);
    }

    #[test]
    fn test_os_family_is_known() {
        assert!(!host_os_family().is_empty());
    }
}
