// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use leadline_app::{Lead, Opportunity, validate_leads, validate_opportunities};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::KeyValueStore;

pub const OPPORTUNITIES_KEY: &str = "opportunities";

pub fn decode_opportunities(raw: &str) -> Result<Vec<Opportunity>> {
    let opportunities: Vec<Opportunity> =
        serde_json::from_str(raw).context("parse stored opportunities")?;
    validate_opportunities(&opportunities)?;
    Ok(opportunities)
}

pub fn encode_opportunities(opportunities: &[Opportunity]) -> Result<String> {
    serde_json::to_string(opportunities).context("encode opportunities")
}

/// Reads the persisted opportunities. Missing, unreadable, or corrupt data
/// yields an empty collection.
pub fn load_opportunities<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Opportunity> {
    let raw = match store.get(OPPORTUNITIES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "opportunity storage unreadable; starting empty");
            return Vec::new();
        }
    };
    match decode_opportunities(&raw) {
        Ok(opportunities) => opportunities,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "stored opportunities are corrupt; starting empty");
            Vec::new()
        }
    }
}

/// Overwrites the whole persisted collection.
pub fn save_opportunities<S: KeyValueStore + ?Sized>(
    store: &mut S,
    opportunities: &[Opportunity],
) -> Result<()> {
    let raw = encode_opportunities(opportunities)?;
    store
        .set(OPPORTUNITIES_KEY, &raw)
        .context("persist opportunities")?;
    info!(count = opportunities.len(), "opportunities saved");
    Ok(())
}

/// Reads a JSON array of leads and validates it.
pub fn load_leads(path: &Path) -> Result<Vec<Lead>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read lead dataset {}", path.display()))?;
    let leads: Vec<Lead> = serde_json::from_str(&raw).with_context(|| {
        format!(
            "parse lead dataset {}; expected a JSON array of leads",
            path.display()
        )
    })?;
    validate_leads(&leads).with_context(|| format!("validate lead dataset {}", path.display()))?;
    Ok(leads)
}
