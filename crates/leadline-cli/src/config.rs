// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use leadline_app::{
    DEFAULT_CONVERSION_DELAY, LeadField, LeadQuery, MAX_CONVERSION_DELAY, SortDirection,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SORT_FIELD: &str = "score";
const DEFAULT_SORT_DIRECTION: &str = "desc";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub conversion: Conversion,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            data: Data::default(),
            conversion: Conversion::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub leads_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversion {
    pub delay: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_sort_field: Option<String>,
    pub default_sort_direction: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_sort_field: Some(DEFAULT_SORT_FIELD.to_owned()),
            default_sort_direction: Some(DEFAULT_SORT_DIRECTION.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LEADLINE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set LEADLINE_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(leadline_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` at the top and keep values under [storage], [data], [conversion], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `leadline --print-example-config` for the current schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            leadline_db::validate_db_path(db_path)?;
        }

        if let Some(leads_path) = &self.data.leads_path
            && leads_path.trim().is_empty()
        {
            bail!(
                "data.leads_path in {} is empty; remove it or point it at a JSON lead file",
                path.display()
            );
        }

        if let Some(delay) = &self.conversion.delay {
            let parsed = parse_duration(delay)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "conversion.delay in {} must be positive, got {}",
                    path.display(),
                    delay
                );
            }
            if parsed > MAX_CONVERSION_DELAY {
                bail!(
                    "conversion.delay in {} is {}; the longest allowed delay is 60m",
                    path.display(),
                    delay
                );
            }
        }

        if let Some(direction) = &self.ui.default_sort_direction
            && SortDirection::parse(direction.trim()).is_none()
        {
            bail!(
                "ui.default_sort_direction in {} must be \"asc\" or \"desc\", got {:?}",
                path.display(),
                direction
            );
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!(
                "log.level in {} is empty; use a filter such as \"info\" or \"leadline_app=debug\"",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => leadline_db::default_db_path(),
        }
    }

    pub fn leads_path(&self) -> Option<PathBuf> {
        self.data.leads_path.as_deref().map(PathBuf::from)
    }

    pub fn conversion_delay(&self) -> Result<Duration> {
        match &self.conversion.delay {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_CONVERSION_DELAY),
        }
    }

    /// Starting query for the leads table. An unrecognized field name leaves
    /// the table unsorted.
    pub fn initial_query(&self) -> LeadQuery {
        let field = self
            .ui
            .default_sort_field
            .as_deref()
            .unwrap_or(DEFAULT_SORT_FIELD);
        let direction = self
            .ui
            .default_sort_direction
            .as_deref()
            .and_then(|raw| SortDirection::parse(raw.trim()))
            .unwrap_or(SortDirection::Desc);
        if LeadField::parse(field.trim()).is_none() {
            tracing::warn!(field, "unknown ui.default_sort_field; leads start unsorted");
        }
        let mut query = LeadQuery::default();
        query.set_sort_by_name(field, direction);
        query
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.as_deref().map(PathBuf::from)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# leadline config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/leadline/leadline.db)\n# db_path = \"/absolute/path/to/leadline.db\"\n\n[data]\n# JSON array of leads shown on the dashboard\n# leads_path = \"/absolute/path/to/leads.json\"\n\n[conversion]\ndelay = \"{}ms\"\n\n[ui]\ndefault_sort_field = \"{}\"\ndefault_sort_direction = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Logs are discarded while the dashboard is open unless a file is set\n# file = \"/absolute/path/to/leadline.log\"\n",
            path.display(),
            DEFAULT_CONVERSION_DELAY.as_millis(),
            DEFAULT_SORT_FIELD,
            DEFAULT_SORT_DIRECTION,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 1500ms or 2s)")
}
