// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};

use crate::{
    Lead, LeadId, LeadStatus, Opportunity, OpportunityId, validate_leads, validate_opportunities,
};

/// Session-owned lead and opportunity collections.
///
/// Reads are public. Writes are crate-private so only the edit controller and
/// the conversion workflow can change records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordStore {
    leads: Vec<Lead>,
    opportunities: Vec<Opportunity>,
}

impl RecordStore {
    pub fn new(leads: Vec<Lead>, opportunities: Vec<Opportunity>) -> Result<Self> {
        validate_leads(&leads).context("load lead dataset")?;
        validate_opportunities(&opportunities).context("load opportunities")?;
        Ok(Self {
            leads,
            opportunities,
        })
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn opportunities(&self) -> &[Opportunity] {
        &self.opportunities
    }

    pub fn lead(&self, lead_id: LeadId) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id == lead_id)
    }

    pub fn next_opportunity_id(&self) -> OpportunityId {
        let max = self
            .opportunities
            .iter()
            .map(|opportunity| opportunity.id.get())
            .max()
            .unwrap_or(0);
        OpportunityId::new(max + 1)
    }

    pub(crate) fn lead_mut(&mut self, lead_id: LeadId) -> Option<&mut Lead> {
        self.leads.iter_mut().find(|lead| lead.id == lead_id)
    }

    /// Appends the opportunity and flips the lead in one step. Returns false
    /// and changes nothing when the lead is gone.
    pub(crate) fn apply_conversion(&mut self, lead_id: LeadId, opportunity: Opportunity) -> bool {
        let Some(lead) = self.lead_mut(lead_id) else {
            return false;
        };
        lead.status = LeadStatus::Converted;
        self.opportunities.push(opportunity);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::{Lead, LeadId, LeadStatus, Opportunity, OpportunityId, OpportunityStage};

    fn lead(id: i64) -> Lead {
        Lead {
            id: LeadId::new(id),
            name: format!("Lead {id}"),
            company: "Acme".to_owned(),
            email: format!("lead{id}@acme.com"),
            source: "web".to_owned(),
            score: 70,
            status: LeadStatus::New,
        }
    }

    fn opportunity(id: i64) -> Opportunity {
        Opportunity {
            id: OpportunityId::new(id),
            name: "Deal".to_owned(),
            stage: OpportunityStage::Closed,
            amount: None,
            account_name: "Someone".to_owned(),
        }
    }

    #[test]
    fn next_opportunity_id_starts_at_one() {
        let store = RecordStore::default();
        assert_eq!(store.next_opportunity_id(), OpportunityId::new(1));
    }

    #[test]
    fn next_opportunity_id_uses_max_not_len() {
        let store = RecordStore::new(vec![], vec![opportunity(7), opportunity(2)])
            .expect("valid store");
        assert_eq!(store.next_opportunity_id(), OpportunityId::new(8));
    }

    #[test]
    fn new_rejects_duplicate_lead_ids() {
        let error = RecordStore::new(vec![lead(1), lead(1)], vec![])
            .expect_err("duplicate ids should fail");
        assert!(format!("{error:#}").contains("load lead dataset"));
    }

    #[test]
    fn apply_conversion_ignores_unknown_lead() {
        let mut store = RecordStore::new(vec![lead(1)], vec![]).expect("valid store");
        assert!(!store.apply_conversion(LeadId::new(9), opportunity(1)));
        assert!(store.opportunities().is_empty());
        assert_eq!(store.leads()[0].status, LeadStatus::New);
    }
}
