//! Facts about the host system running the benchmarks.

use std::env::consts;

use serde::{Deserialize, Serialize};
use sysinfo::{CpuExt, CpuRefreshKind, RefreshKind, System, SystemExt};

/// A single logical CPU of the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// CPU brand string.
    pub model: String,
    /// Frequency in MHz.
    pub speed: u64,
}

/// Host facts attached to every benchmark result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// Operating system family, e.g. `linux`.
    pub os: String,
    /// CPU architecture, e.g. `x86_64`.
    pub arch: String,
    /// Brand of the first CPU.
    pub cpu: String,
    /// Number of logical CPUs.
    pub cpu_count: usize,
    /// Every logical CPU.
    pub cpus: Vec<CpuInfo>,
    /// Total memory in bytes.
    pub mem: u64,
}

impl SystemInfo {
    /// Collects facts about the current host.
    #[must_use]
    pub fn collect() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(),
        );

        let cpus: Vec<CpuInfo> = sys
            .cpus()
            .iter()
            .map(|cpu| CpuInfo {
                model: cpu.brand().to_string(),
                speed: cpu.frequency(),
            })
            .collect();
        let info = Self {
            os: consts::OS.to_string(),
            arch: consts::ARCH.to_string(),
            cpu: cpus.first().map(|cpu| cpu.model.clone()).unwrap_or_default(),
            cpu_count: cpus.len(),
            cpus,
            mem: sys.total_memory(),
        };
        log::trace!("system info: {info:#?}");

        info
    }
}
