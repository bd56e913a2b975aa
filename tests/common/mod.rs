#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use runtime_bench::{
    config::{RuntimeConfig, RuntimeDecl},
    system::{CpuInfo, SystemInfo},
};

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that write executables and spawn them, so no executable is still open for writing in a forked
/// child when another test execs it.
pub fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn system() -> SystemInfo {
    SystemInfo {
        os: "Linux".to_string(),
        arch: "x86_64".to_string(),
        cpu: "Test CPU".to_string(),
        cpu_count: 1,
        cpus: vec![CpuInfo {
            model: "Test CPU".to_string(),
            speed: 3000,
        }],
        mem: 1024,
    }
}

/// Writes an executable shell script standing in for a runtime binary.
#[cfg(unix)]
pub fn write_runtime(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn write_suite(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

pub fn runtime(name: &str, bin: &Path) -> RuntimeDecl {
    RuntimeDecl::Config(RuntimeConfig {
        name: name.to_string(),
        bin: Some(bin.to_string_lossy().into_owned()),
        version: None,
    })
}

pub const THREE_BENCHMARKS: &str = r#"{"benchmarks":[
  {"name":"sort","group":null,"warmup":true,"baseline":false,"async":false,"stats":{"min":5,"max":50,"p50":10,"p75":12,"p99":40,"p999":48,"avg":11}},
  {"name":"map","group":null,"warmup":true,"baseline":false,"async":false,"stats":{"min":5,"max":5,"p50":5,"p75":5,"p99":5,"p999":5,"avg":5}},
  {"name":"reduce","group":"folds","warmup":true,"baseline":true,"async":true,"stats":{"min":1,"max":2,"p50":1,"p75":1,"p999":2,"avg":1.5}}
]}"#;
