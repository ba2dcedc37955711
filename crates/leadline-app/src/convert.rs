// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

use crate::{Lead, LeadId, LeadStatus, Opportunity, OpportunityStage, RecordStore};

pub const MIN_CONVERSION_SCORE: u8 = 60;
pub const DEFAULT_CONVERSION_DELAY: Duration = Duration::from_millis(1500);
pub const MAX_CONVERSION_DELAY: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionRejection {
    #[error("a conversion is already in progress -- wait for it to finish")]
    Busy,
    #[error("lead {0} no longer exists")]
    UnknownLead(LeadId),
    #[error("lead score {score} is below {MIN_CONVERSION_SCORE}")]
    ScoreTooLow { score: u8 },
    #[error("{status} leads cannot be converted")]
    IneligibleStatus { status: LeadStatus },
}

/// Per-lead eligibility, ignoring whether another conversion is running.
pub fn conversion_eligibility(lead: &Lead) -> Result<(), ConversionRejection> {
    if lead.score < MIN_CONVERSION_SCORE {
        return Err(ConversionRejection::ScoreTooLow { score: lead.score });
    }
    if matches!(lead.status, LeadStatus::Unqualified | LeadStatus::Converted) {
        return Err(ConversionRejection::IneligibleStatus {
            status: lead.status,
        });
    }
    Ok(())
}

/// A scheduled conversion. The lead is captured when the conversion starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConversion {
    lead: Lead,
    due_at: Instant,
}

impl PendingConversion {
    pub fn lead_id(&self) -> LeadId {
        self.lead.id
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.due_at.saturating_duration_since(now)
    }
}

/// Single global in-flight conversion. The owner drives completion by
/// calling [`ConversionWorkflow::poll`] with the current instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWorkflow {
    delay: Duration,
    pending: Option<PendingConversion>,
}

impl Default for ConversionWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSION_DELAY)
    }
}

impl ConversionWorkflow {
    /// Delays above [`MAX_CONVERSION_DELAY`] are clamped to it.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.min(MAX_CONVERSION_DELAY),
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingConversion> {
        self.pending.as_ref()
    }

    pub fn can_convert(&self, lead: &Lead) -> Result<(), ConversionRejection> {
        if self.is_busy() {
            return Err(ConversionRejection::Busy);
        }
        conversion_eligibility(lead)
    }

    pub fn start(
        &mut self,
        store: &RecordStore,
        lead_id: LeadId,
        now: Instant,
    ) -> Result<&PendingConversion, ConversionRejection> {
        if self.is_busy() {
            return Err(ConversionRejection::Busy);
        }
        let lead = store
            .lead(lead_id)
            .ok_or(ConversionRejection::UnknownLead(lead_id))?;
        conversion_eligibility(lead)?;

        // An instant near the platform limit completes on the next poll.
        let due_at = now.checked_add(self.delay).unwrap_or(now);
        info!(lead_id = %lead_id, delay_ms = self.delay.as_millis() as u64, "conversion started");
        Ok(self.pending.insert(PendingConversion {
            lead: lead.clone(),
            due_at,
        }))
    }

    /// Completes the pending conversion once it is due. The opportunity append,
    /// the status flip, and clearing the busy flag happen together.
    pub fn poll(&mut self, store: &mut RecordStore, now: Instant) -> Option<Opportunity> {
        if !self.pending.as_ref().is_some_and(|pending| pending.is_due(now)) {
            return None;
        }
        let pending = self.pending.take()?;
        let opportunity = opportunity_for(&pending.lead, store);
        if !store.apply_conversion(pending.lead.id, opportunity.clone()) {
            return None;
        }
        info!(
            lead_id = %pending.lead.id,
            opportunity_id = %opportunity.id,
            "conversion completed"
        );
        Some(opportunity)
    }
}

fn opportunity_for(lead: &Lead, store: &RecordStore) -> Opportunity {
    Opportunity {
        id: store.next_opportunity_id(),
        name: format!("{} Deal", lead.company),
        stage: OpportunityStage::Won,
        amount: Some(0.0),
        account_name: lead.name.clone(),
    }
}
