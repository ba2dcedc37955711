// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::*;

pub const MAX_LEAD_SCORE: u8 = 100;

/// Lifecycle status of a lead. Tables sort it by name; the derived `Ord`
/// only keys filter sets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Unqualified,
}

impl LeadStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Converted,
        Self::Unqualified,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Converted => "converted",
            Self::Unqualified => "unqualified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "converted" => Some(Self::Converted),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::Converted => "Converted",
            Self::Unqualified => "Unqualified",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStage {
    Won,
    Closed,
}

impl OpportunityStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub source: String,
    pub score: u8,
    pub status: LeadStatus,
}

impl Lead {
    pub fn score_tier(&self) -> ScoreTier {
        ScoreTier::for_score(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: OpportunityId,
    pub name: String,
    pub stage: OpportunityStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub account_name: String,
}

/// Lead attributes a table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadField {
    Id,
    Name,
    Company,
    Email,
    Source,
    Score,
    Status,
}

impl LeadField {
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Name,
        Self::Company,
        Self::Email,
        Self::Source,
        Self::Score,
        Self::Status,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Company => "company",
            Self::Email => "email",
            Self::Source => "source",
            Self::Score => "score",
            Self::Status => "status",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "company" => Some(Self::Company),
            "email" => Some(Self::Email),
            "source" => Some(Self::Source),
            "score" => Some(Self::Score),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::Company => "Company",
            Self::Email => "Email",
            Self::Source => "Source",
            Self::Score => "Score",
            Self::Status => "Status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterField {
    Source,
    Status,
}

impl FilterField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreTier {
    High,
    Moderate,
    Low,
}

impl ScoreTier {
    pub const fn for_score(score: u8) -> Self {
        if score >= 80 {
            Self::High
        } else if score >= 60 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            Self::High => "high-quality lead with strong conversion potential",
            Self::Moderate => "moderate lead quality, requires nurturing",
            Self::Low => "low score, may need qualification or re-evaluation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TabKind {
    #[default]
    Leads,
    Opportunities,
}

impl TabKind {
    pub const ALL: [Self; 2] = [Self::Leads, Self::Opportunities];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Opportunities => "opportunities",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Leads => Self::Opportunities,
            Self::Opportunities => Self::Leads,
        }
    }
}

pub fn validate_leads(leads: &[Lead]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for lead in leads {
        if !lead.id.is_valid() {
            bail!(
                "lead id {} is not positive -- lead ids must start at 1",
                lead.id
            );
        }
        if !seen.insert(lead.id) {
            bail!("lead id {} appears more than once -- lead ids must be unique", lead.id);
        }
        if lead.score > MAX_LEAD_SCORE {
            bail!(
                "lead {} has score {}; scores must be between 0 and {MAX_LEAD_SCORE}",
                lead.id,
                lead.score
            );
        }
    }
    Ok(())
}

pub fn validate_opportunities(opportunities: &[Opportunity]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for opportunity in opportunities {
        if !opportunity.id.is_valid() {
            bail!("opportunity id {} is not positive", opportunity.id);
        }
        if !seen.insert(opportunity.id) {
            bail!("opportunity id {} appears more than once", opportunity.id);
        }
        if let Some(amount) = opportunity.amount
            && !(amount.is_finite() && amount >= 0.0)
        {
            bail!(
                "opportunity {} has amount {amount}; amounts cannot be negative",
                opportunity.id
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        Lead, LeadField, LeadStatus, Opportunity, OpportunityStage, ScoreTier, SortDirection,
        validate_leads, validate_opportunities,
    };
    use crate::{LeadId, OpportunityId};

    fn lead(id: i64, score: u8) -> Lead {
        Lead {
            id: LeadId::new(id),
            name: "Jo".to_owned(),
            company: "Acme".to_owned(),
            email: "jo@acme.com".to_owned(),
            source: "web".to_owned(),
            score,
            status: LeadStatus::New,
        }
    }

    #[test]
    fn status_and_field_names_round_trip() {
        for status in LeadStatus::ALL {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
        for field in LeadField::ALL {
            assert_eq!(LeadField::parse(field.as_str()), Some(field));
        }
        assert_eq!(LeadField::parse("revenue"), None);
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
    }

    #[test]
    fn score_tiers_split_at_sixty_and_eighty() {
        assert_eq!(ScoreTier::for_score(80), ScoreTier::High);
        assert_eq!(ScoreTier::for_score(79), ScoreTier::Moderate);
        assert_eq!(ScoreTier::for_score(60), ScoreTier::Moderate);
        assert_eq!(ScoreTier::for_score(59), ScoreTier::Low);
    }

    #[test]
    fn validate_leads_rejects_duplicate_ids() {
        let error = validate_leads(&[lead(1, 50), lead(1, 60)])
            .expect_err("duplicate ids should fail");
        assert!(error.to_string().contains("more than once"));
    }

    #[test]
    fn validate_leads_rejects_out_of_range_score() {
        assert!(validate_leads(&[lead(1, 101)]).is_err());
        assert!(validate_leads(&[lead(0, 10)]).is_err());
        assert!(validate_leads(&[lead(1, 100), lead(2, 0)]).is_ok());
    }

    #[test]
    fn validate_opportunities_rejects_negative_amount() {
        let opportunity = Opportunity {
            id: OpportunityId::new(1),
            name: "Acme Deal".to_owned(),
            stage: OpportunityStage::Won,
            amount: Some(-1.0),
            account_name: "Jo".to_owned(),
        };
        assert!(validate_opportunities(&[opportunity]).is_err());
    }

    #[test]
    fn opportunity_serializes_with_camel_case_account_name() {
        let opportunity = Opportunity {
            id: OpportunityId::new(3),
            name: "Acme Deal".to_owned(),
            stage: OpportunityStage::Won,
            amount: Some(0.0),
            account_name: "Jo".to_owned(),
        };
        let json = serde_json::to_value(&opportunity).expect("serialize opportunity");
        assert_eq!(json["id"], 3);
        assert_eq!(json["stage"], "won");
        assert_eq!(json["accountName"], "Jo");
    }
}
