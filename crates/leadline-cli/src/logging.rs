// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LEADLINE_LOG";

/// Where log lines go for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Plain stderr, used by one-shot commands like `--check`.
    Stderr,
    /// The terminal belongs to the dashboard; write to `[log].file` or nowhere.
    Dashboard,
}

/// `LEADLINE_LOG` wins over `[log].level` when it is set and non-empty.
pub fn resolve_filter_directive(env_value: Option<String>, config_level: &str) -> String {
    env_value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| config_level.trim().to_owned())
}

pub fn init(directive: &str, file: Option<&Path>, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log filter {directive:?}; set [log].level or {LOG_ENV}"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match (file, target) {
        (Some(path), _) => {
            let log_file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init()
        }
        (None, LogTarget::Stderr) => builder.with_writer(io::stderr).try_init(),
        (None, LogTarget::Dashboard) => builder.with_writer(io::sink).try_init(),
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}; check [log].file", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{open_log_file, resolve_filter_directive};
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn env_directive_overrides_config_level() {
        assert_eq!(
            resolve_filter_directive(Some("leadline_app=debug".to_owned()), "info"),
            "leadline_app=debug"
        );
    }

    #[test]
    fn blank_env_directive_falls_back_to_config() {
        assert_eq!(resolve_filter_directive(Some("  ".to_owned()), "warn"), "warn");
        assert_eq!(resolve_filter_directive(None, " info "), "info");
    }

    #[test]
    fn log_file_is_created_with_parents_and_appended() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("leadline.log");

        writeln!(open_log_file(&path)?, "first")?;
        writeln!(open_log_file(&path)?, "second")?;

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }
}
