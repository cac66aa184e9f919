// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ABODE_LOG";
const DEBUG_ENV: &str = "ABODE_DEBUG_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: the terminal is free.
    Stderr,
    /// The shell owns the terminal, so logs go to a file.
    File(PathBuf),
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// or buffered file output is lost.
pub fn init(config_level: &str, target: LogTarget) -> Result<Option<WorkerGuard>> {
    let directive = filter_directive(
        config_level,
        env::var(DEBUG_ENV).ok().as_deref(),
        env::var(LOG_ENV).ok().as_deref(),
    );
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}; check {LOG_ENV} or [log].level"))?;

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|error| anyhow!("install stderr logger: {error}"))?;
            Ok(None)
        }
        LogTarget::File(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("log file {} has no file name", path.display()))?;
            fs::create_dir_all(&directory)
                .with_context(|| format!("create log directory {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(&directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|error| anyhow!("install file logger {}: {error}", path.display()))?;
            Ok(Some(guard))
        }
    }
}

/// Debug flag beats `ABODE_LOG`, which beats the config level.
fn filter_directive(config_level: &str, debug_env: Option<&str>, log_env: Option<&str>) -> String {
    let debug_enabled = debug_env
        .map(|value| matches!(value, "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        return "debug".to_owned();
    }
    match log_env.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => config_level.to_owned(),
    }
}
