// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use leadline_app::{Lead, LeadId, LeadStatus, MAX_LEAD_SCORE};
use std::path::{Path, PathBuf};

pub const DEMO_SEED: u64 = 20_260_219;
pub const DEMO_LEAD_COUNT: usize = 24;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const COMPANY_STEMS: [&str; 14] = [
    "Acme",
    "Globex",
    "Initech",
    "Umbrella",
    "Hooli",
    "Vandelay",
    "Stark",
    "Wayne",
    "Tyrell",
    "Cyberdyne",
    "Soylent",
    "Wonka",
    "Gringotts",
    "Oscorp",
];
const COMPANY_SUFFIXES: [&str; 6] = ["Corp", "Labs", "Group", "Industries", "Systems", "Co"];

const SOURCES: [&str; 6] = [
    "web",
    "referral",
    "event",
    "cold call",
    "partner",
    "social",
];

/// Statuses a generated lead can start in. Converted is left to the
/// conversion workflow.
const OPEN_STATUSES: [LeadStatus; 4] = [
    LeadStatus::New,
    LeadStatus::Contacted,
    LeadStatus::Qualified,
    LeadStatus::Unqualified,
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for realistic lead records. Ids are assigned
/// sequentially from 1.
#[derive(Debug, Clone)]
pub struct LeadFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl LeadFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn lead(&mut self) -> Lead {
        let id = LeadId::new(self.next_id);
        self.next_id += 1;

        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let company = format!(
            "{} {}",
            self.pick(&COMPANY_STEMS),
            self.pick(&COMPANY_SUFFIXES)
        );
        let domain = company.to_lowercase().replace(' ', "");
        let status = OPEN_STATUSES[self.rng.int_n(OPEN_STATUSES.len())];
        let score = self.rng.int_n(usize::from(MAX_LEAD_SCORE) + 1) as u8;

        Lead {
            id,
            name: format!("{first} {last}"),
            email: format!("{}.{}@{domain}.com", first.to_lowercase(), last.to_lowercase()),
            company,
            source: self.pick(&SOURCES).to_owned(),
            score,
            status,
        }
    }

    pub fn leads(&mut self, count: usize) -> Vec<Lead> {
        (0..count).map(|_| self.lead()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// The fixed dataset shown by `--demo`.
pub fn demo_leads() -> Vec<Lead> {
    LeadFaker::new(DEMO_SEED).leads(DEMO_LEAD_COUNT)
}

pub fn lead_fixture(id: i64, name: &str, company: &str, score: u8, status: LeadStatus) -> Lead {
    let local = name.split_whitespace().next().unwrap_or(name).to_lowercase();
    let domain = company.to_lowercase().replace(' ', "");
    Lead {
        id: LeadId::new(id),
        name: name.to_owned(),
        company: company.to_owned(),
        email: format!("{local}@{domain}.com"),
        source: "web".to_owned(),
        score,
        status,
    }
}

pub fn write_leads_file(dir: &Path, leads: &[Lead]) -> Result<PathBuf> {
    let path = dir.join("leads.json");
    let json = serde_json::to_string_pretty(leads).context("encode leads")?;
    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("leadline.db");
    Ok((dir, db_path))
}
