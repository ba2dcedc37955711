// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::{FilterField, Lead, LeadField, LeadStatus, SortDirection};

/// Search, filter, and sort settings for the leads table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadQuery {
    pub search: String,
    pub sources: BTreeSet<String>,
    pub statuses: BTreeSet<LeadStatus>,
    pub sort_field: Option<LeadField>,
    pub sort_direction: SortDirection,
}

impl Default for LeadQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sources: BTreeSet::new(),
            statuses: BTreeSet::new(),
            sort_field: Some(LeadField::Score),
            sort_direction: SortDirection::Desc,
        }
    }
}

impl LeadQuery {
    pub fn unsorted() -> Self {
        Self {
            sort_field: None,
            sort_direction: SortDirection::Asc,
            ..Self::default()
        }
    }

    /// Sets the sort field from its text name. Unknown names clear the sort.
    pub fn set_sort_by_name(&mut self, name: &str, direction: SortDirection) {
        self.sort_field = LeadField::parse(name.trim());
        self.sort_direction = direction;
    }

    /// Header activation: same field flips direction, a new field starts ascending.
    pub fn toggle_sort(&mut self, field: LeadField) {
        if self.sort_field == Some(field) {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = Some(field);
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn toggle_source(&mut self, source: &str) -> bool {
        if self.sources.remove(source) {
            false
        } else {
            self.sources.insert(source.to_owned());
            true
        }
    }

    pub fn toggle_status(&mut self, status: LeadStatus) -> bool {
        if self.statuses.remove(&status) {
            false
        } else {
            self.statuses.insert(status);
            true
        }
    }

    pub fn clear_filter(&mut self, field: FilterField) {
        match field {
            FilterField::Source => self.sources.clear(),
            FilterField::Status => self.statuses.clear(),
        }
    }

    pub fn filter_count(&self, field: FilterField) -> usize {
        match field {
            FilterField::Source => self.sources.len(),
            FilterField::Status => self.statuses.len(),
        }
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        self.matches_with_needle(lead, &self.search.to_lowercase())
    }

    /// `needle` is the search text already lowercased.
    fn matches_with_needle(&self, lead: &Lead, needle: &str) -> bool {
        matches_search(lead, needle)
            && (self.sources.is_empty() || self.sources.contains(&lead.source))
            && (self.statuses.is_empty() || self.statuses.contains(&lead.status))
    }
}

/// Derives the displayed leads. Never mutates `records`; with no sort field
/// the store order is kept.
pub fn derive_view<'a>(records: &'a [Lead], query: &LeadQuery) -> Vec<&'a Lead> {
    let needle = query.search.to_lowercase();
    let mut rows: Vec<&Lead> = records
        .iter()
        .filter(|lead| query.matches_with_needle(lead, &needle))
        .collect();

    if let Some(field) = query.sort_field {
        // slice::sort_by is stable, so ties keep store order in both directions.
        rows.sort_by(|left, right| {
            let ordering = compare_leads(field, left, right);
            match query.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    rows
}

pub fn compare_leads(field: LeadField, left: &Lead, right: &Lead) -> Ordering {
    match field {
        LeadField::Id => left.id.cmp(&right.id),
        LeadField::Name => compare_text(&left.name, &right.name),
        LeadField::Company => compare_text(&left.company, &right.company),
        LeadField::Email => compare_text(&left.email, &right.email),
        LeadField::Source => compare_text(&left.source, &right.source),
        LeadField::Score => left.score.cmp(&right.score),
        LeadField::Status => compare_text(left.status.as_str(), right.status.as_str()),
    }
}

/// Distinct sources in first-seen order.
pub fn source_options(records: &[Lead]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter(|lead| seen.insert(lead.source.as_str()))
        .map(|lead| lead.source.clone())
        .collect()
}

/// Distinct statuses in first-seen order.
pub fn status_options(records: &[Lead]) -> Vec<LeadStatus> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter(|lead| seen.insert(lead.status))
        .map(|lead| lead.status)
        .collect()
}

pub fn count_label(shown: usize, total: usize) -> String {
    format!("{shown} of {total} leads")
}

fn matches_search(lead: &Lead, needle: &str) -> bool {
    needle.is_empty()
        || lead.name.to_lowercase().contains(needle)
        || lead.company.to_lowercase().contains(needle)
        || lead.email.to_lowercase().contains(needle)
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}
