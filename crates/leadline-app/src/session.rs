// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::{
    ConversionRejection, ConversionWorkflow, EditCommit, EditError, EditField, EditState,
    FilterField, Lead, LeadField, LeadId, LeadQuery, LeadStatus, Opportunity, OpportunityId,
    PendingConversion, RecordStore, TabKind, count_label, derive_view, source_options,
    status_options,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub conversion_delay: Duration,
    pub initial_query: LeadQuery,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            conversion_delay: crate::DEFAULT_CONVERSION_DELAY,
            initial_query: LeadQuery::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    NextTab,
    ShowTab(TabKind),
    SetSearch(String),
    SortBy(LeadField),
    ToggleSourceFilter(String),
    ToggleStatusFilter(LeadStatus),
    ClearFilter(FilterField),
    BeginEdit { lead_id: LeadId, field: EditField },
    EditInput(String),
    CommitEdit,
    CancelEdit,
    OpenDetails(LeadId),
    CloseDetails,
    Convert(LeadId),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TabChanged(TabKind),
    QueryChanged,
    EditStarted { lead_id: LeadId, field: EditField },
    EditCancelled { lead_id: LeadId, field: EditField },
    EditCommitted(EditCommit),
    EditRejected(EditError),
    DetailsOpened(LeadId),
    DetailsClosed,
    DetailsSuppressed,
    ConversionStarted(LeadId),
    ConversionRejected(ConversionRejection),
    ConversionCompleted {
        lead_id: LeadId,
        opportunity_id: OpportunityId,
    },
    OpportunitiesChanged,
    StatusUpdated(String),
    StatusCleared,
}

/// One dashboard session: the record store plus all view-model state that
/// acts on it.
#[derive(Debug, Clone)]
pub struct Session {
    store: RecordStore,
    query: LeadQuery,
    edit: EditState,
    conversion: ConversionWorkflow,
    active_tab: TabKind,
    details: Option<LeadId>,
    status_line: Option<String>,
}

impl Session {
    pub fn new(store: RecordStore, options: SessionOptions) -> Self {
        Self {
            store,
            query: options.initial_query,
            edit: EditState::Idle,
            conversion: ConversionWorkflow::new(options.conversion_delay),
            active_tab: TabKind::Leads,
            details: None,
            status_line: None,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn leads(&self) -> &[Lead] {
        self.store.leads()
    }

    pub fn opportunities(&self) -> &[Opportunity] {
        self.store.opportunities()
    }

    pub fn query(&self) -> &LeadQuery {
        &self.query
    }

    pub fn edit(&self) -> &EditState {
        &self.edit
    }

    pub fn active_tab(&self) -> TabKind {
        self.active_tab
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn visible_leads(&self) -> Vec<&Lead> {
        derive_view(self.store.leads(), &self.query)
    }

    pub fn count_label(&self) -> String {
        count_label(self.visible_leads().len(), self.store.leads().len())
    }

    pub fn source_options(&self) -> Vec<String> {
        source_options(self.store.leads())
    }

    pub fn status_options(&self) -> Vec<LeadStatus> {
        status_options(self.store.leads())
    }

    pub fn details_lead(&self) -> Option<&Lead> {
        self.details.and_then(|lead_id| self.store.lead(lead_id))
    }

    pub fn is_converting(&self) -> bool {
        self.conversion.is_busy()
    }

    pub fn pending_conversion(&self) -> Option<&PendingConversion> {
        self.conversion.pending()
    }

    /// Gate for the convert control.
    pub fn can_convert(&self, lead_id: LeadId) -> Result<(), ConversionRejection> {
        let lead = self
            .store
            .lead(lead_id)
            .ok_or(ConversionRejection::UnknownLead(lead_id))?;
        self.conversion.can_convert(lead)
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        self.dispatch_at(command, Instant::now())
    }

    pub fn dispatch_at(&mut self, command: SessionCommand, now: Instant) -> Vec<SessionEvent> {
        match command {
            SessionCommand::NextTab => self.show_tab(self.active_tab.next()),
            SessionCommand::ShowTab(tab) => self.show_tab(tab),
            SessionCommand::SetSearch(search) => {
                self.query.search = search;
                vec![SessionEvent::QueryChanged]
            }
            SessionCommand::SortBy(field) => {
                self.query.toggle_sort(field);
                debug!(
                    field = field.as_str(),
                    direction = self.query.sort_direction.as_str(),
                    "sort changed"
                );
                vec![SessionEvent::QueryChanged]
            }
            SessionCommand::ToggleSourceFilter(source) => {
                self.query.toggle_source(&source);
                vec![SessionEvent::QueryChanged]
            }
            SessionCommand::ToggleStatusFilter(status) => {
                self.query.toggle_status(status);
                vec![SessionEvent::QueryChanged]
            }
            SessionCommand::ClearFilter(field) => {
                self.query.clear_filter(field);
                vec![SessionEvent::QueryChanged]
            }
            SessionCommand::BeginEdit { lead_id, field } => self.begin_edit(lead_id, field),
            SessionCommand::EditInput(value) => {
                self.edit.input(value);
                Vec::new()
            }
            SessionCommand::CommitEdit => self.commit_edit(),
            SessionCommand::CancelEdit => self.cancel_edit(),
            SessionCommand::OpenDetails(lead_id) => self.open_details(lead_id),
            SessionCommand::CloseDetails => {
                if self.details.take().is_some() {
                    vec![SessionEvent::DetailsClosed]
                } else {
                    Vec::new()
                }
            }
            SessionCommand::Convert(lead_id) => self.start_conversion(lead_id, now),
            SessionCommand::SetStatus(message) => vec![self.set_status(message)],
            SessionCommand::ClearStatus => {
                self.status_line = None;
                vec![SessionEvent::StatusCleared]
            }
        }
    }

    /// Completes a due conversion. Call on every timer tick.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        let Some(lead_id) = self.conversion.pending().map(PendingConversion::lead_id) else {
            return Vec::new();
        };
        let Some(opportunity) = self.conversion.poll(&mut self.store, now) else {
            if !self.conversion.is_busy() {
                warn!(lead_id = %lead_id, "conversion dropped; lead no longer exists");
            }
            return Vec::new();
        };
        let message = format!("converted to {}", opportunity.name);
        vec![
            SessionEvent::ConversionCompleted {
                lead_id,
                opportunity_id: opportunity.id,
            },
            SessionEvent::OpportunitiesChanged,
            self.set_status(message),
        ]
    }

    fn show_tab(&mut self, tab: TabKind) -> Vec<SessionEvent> {
        let mut events = self.cancel_edit();
        self.active_tab = tab;
        events.push(SessionEvent::TabChanged(tab));
        events
    }

    fn begin_edit(&mut self, lead_id: LeadId, field: EditField) -> Vec<SessionEvent> {
        let Some(lead) = self.store.lead(lead_id) else {
            return vec![self.set_status(EditError::UnknownLead(lead_id).to_string())];
        };
        let mut events = Vec::new();
        if let Some(previous) = self.edit.begin(lead, field) {
            events.push(SessionEvent::EditCancelled {
                lead_id: previous.lead_id,
                field: previous.field,
            });
        }
        events.push(SessionEvent::EditStarted { lead_id, field });
        events
    }

    fn commit_edit(&mut self) -> Vec<SessionEvent> {
        match self.edit.commit(&mut self.store) {
            Ok(commit) => vec![SessionEvent::EditCommitted(commit)],
            Err(EditError::NotEditing) => Vec::new(),
            Err(error) => {
                let message = error.to_string();
                vec![SessionEvent::EditRejected(error), self.set_status(message)]
            }
        }
    }

    fn cancel_edit(&mut self) -> Vec<SessionEvent> {
        match self.edit.cancel() {
            Some(session) => vec![SessionEvent::EditCancelled {
                lead_id: session.lead_id,
                field: session.field,
            }],
            None => Vec::new(),
        }
    }

    fn open_details(&mut self, lead_id: LeadId) -> Vec<SessionEvent> {
        if self.edit.is_editing() {
            return vec![SessionEvent::DetailsSuppressed];
        }
        if self.store.lead(lead_id).is_none() {
            return Vec::new();
        }
        self.details = Some(lead_id);
        vec![SessionEvent::DetailsOpened(lead_id)]
    }

    fn start_conversion(&mut self, lead_id: LeadId, now: Instant) -> Vec<SessionEvent> {
        match self.conversion.start(&self.store, lead_id, now).map(|_| ()) {
            Ok(()) => vec![
                SessionEvent::ConversionStarted(lead_id),
                self.set_status("converting...".to_owned()),
            ],
            Err(rejection) => {
                debug!(lead_id = %lead_id, %rejection, "conversion rejected");
                vec![SessionEvent::ConversionRejected(rejection)]
            }
        }
    }

    fn set_status(&mut self, message: String) -> SessionEvent {
        self.status_line = Some(message.clone());
        SessionEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionCommand, SessionEvent, SessionOptions};
    use crate::{
        EditField, Lead, LeadField, LeadId, LeadQuery, LeadStatus, MAX_CONVERSION_DELAY,
        OpportunityId, RecordStore, SortDirection, TabKind,
    };
    use std::time::{Duration, Instant};

    const DELAY: Duration = Duration::from_millis(1500);

    fn lead(id: i64, name: &str, company: &str, score: u8, status: LeadStatus) -> Lead {
        Lead {
            id: LeadId::new(id),
            name: name.to_owned(),
            company: company.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            source: "web".to_owned(),
            score,
            status,
        }
    }

    fn session() -> Session {
        let store = RecordStore::new(
            vec![
                lead(1, "Jo", "Acme", 75, LeadStatus::New),
                lead(2, "Al", "Globex", 90, LeadStatus::Contacted),
                lead(3, "Cy", "Initech", 30, LeadStatus::New),
            ],
            vec![],
        )
        .expect("valid store");
        Session::new(
            store,
            SessionOptions {
                conversion_delay: DELAY,
                initial_query: LeadQuery::default(),
            },
        )
    }

    #[test]
    fn default_view_sorts_by_score_desc() {
        let session = session();
        assert_eq!(session.query().sort_field, Some(LeadField::Score));
        assert_eq!(session.query().sort_direction, SortDirection::Desc);
        let ids: Vec<i64> = session.visible_leads().iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(session.count_label(), "3 of 3 leads");
    }

    #[test]
    fn active_edit_suppresses_details() {
        let mut session = session();
        session.dispatch(SessionCommand::BeginEdit {
            lead_id: LeadId::new(1),
            field: EditField::Email,
        });

        let events = session.dispatch(SessionCommand::OpenDetails(LeadId::new(2)));
        assert_eq!(events, vec![SessionEvent::DetailsSuppressed]);
        assert!(session.details_lead().is_none());

        session.dispatch(SessionCommand::CancelEdit);
        let events = session.dispatch(SessionCommand::OpenDetails(LeadId::new(2)));
        assert_eq!(events, vec![SessionEvent::DetailsOpened(LeadId::new(2))]);
        assert_eq!(session.details_lead().map(|l| l.id), Some(LeadId::new(2)));
    }

    #[test]
    fn switching_tabs_cancels_edit() {
        let mut session = session();
        session.dispatch(SessionCommand::BeginEdit {
            lead_id: LeadId::new(1),
            field: EditField::Status,
        });
        session.dispatch(SessionCommand::EditInput("qualified".to_owned()));

        let events = session.dispatch(SessionCommand::NextTab);
        assert_eq!(
            events,
            vec![
                SessionEvent::EditCancelled {
                    lead_id: LeadId::new(1),
                    field: EditField::Status,
                },
                SessionEvent::TabChanged(TabKind::Opportunities),
            ]
        );
        assert!(!session.edit().is_editing());
        assert_eq!(session.leads()[0].status, LeadStatus::New);
    }

    #[test]
    fn rejected_email_sets_dismissible_status() {
        let mut session = session();
        session.dispatch(SessionCommand::BeginEdit {
            lead_id: LeadId::new(1),
            field: EditField::Email,
        });
        session.dispatch(SessionCommand::EditInput("broken".to_owned()));
        let events = session.dispatch(SessionCommand::CommitEdit);

        assert!(matches!(events[0], SessionEvent::EditRejected(_)));
        assert!(session.status_line().is_some_and(|s| s.contains("valid email")));
        assert_eq!(session.leads()[0].email, "jo@example.com");

        session.dispatch(SessionCommand::ClearStatus);
        assert!(session.status_line().is_none());
    }

    #[test]
    fn conversion_runs_through_tick() {
        let mut session = session();
        let start = Instant::now();

        let events = session.dispatch_at(SessionCommand::Convert(LeadId::new(1)), start);
        assert_eq!(events[0], SessionEvent::ConversionStarted(LeadId::new(1)));
        assert!(session.is_converting());
        assert!(session.tick(start).is_empty());

        let blocked = session.dispatch_at(SessionCommand::Convert(LeadId::new(2)), start);
        assert!(matches!(blocked[0], SessionEvent::ConversionRejected(_)));
        assert!(session.can_convert(LeadId::new(2)).is_err());

        let done = session.tick(start + DELAY);
        assert_eq!(
            done[0],
            SessionEvent::ConversionCompleted {
                lead_id: LeadId::new(1),
                opportunity_id: OpportunityId::new(1),
            }
        );
        assert_eq!(done[1], SessionEvent::OpportunitiesChanged);
        assert_eq!(session.opportunities().len(), 1);
        assert_eq!(session.opportunities()[0].name, "Acme Deal");
        assert!(session.can_convert(LeadId::new(2)).is_ok());
        assert!(session.can_convert(LeadId::new(1)).is_err());
    }

    #[test]
    fn reads_see_unconverted_state_while_pending() {
        let mut session = session();
        let start = Instant::now();
        session.dispatch_at(SessionCommand::Convert(LeadId::new(1)), start);
        session.dispatch(SessionCommand::SetSearch("acme".to_owned()));

        let rows = session.visible_leads();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, LeadStatus::New);
        assert!(session.opportunities().is_empty());
    }

    #[test]
    fn low_score_conversion_is_noop() {
        let mut session = session();
        let events = session.dispatch(SessionCommand::Convert(LeadId::new(3)));
        assert!(matches!(events[0], SessionEvent::ConversionRejected(_)));
        assert!(!session.is_converting());
        assert!(session.tick(Instant::now() + DELAY).is_empty());
        assert!(session.opportunities().is_empty());
    }

    #[test]
    fn independent_sessions_do_not_share_busy_flag() {
        let mut first = session();
        let second = session();
        first.dispatch(SessionCommand::Convert(LeadId::new(1)));
        assert!(first.is_converting());
        assert!(!second.is_converting());
        assert!(second.can_convert(LeadId::new(2)).is_ok());
    }

    #[test]
    fn huge_conversion_delay_still_completes() {
        let store = RecordStore::new(vec![lead(1, "Jo", "Acme", 75, LeadStatus::New)], vec![])
            .expect("valid store");
        let mut session = Session::new(
            store,
            SessionOptions {
                conversion_delay: Duration::from_secs(u64::MAX),
                initial_query: LeadQuery::default(),
            },
        );
        let start = Instant::now();

        let events = session.dispatch_at(SessionCommand::Convert(LeadId::new(1)), start);
        assert_eq!(events[0], SessionEvent::ConversionStarted(LeadId::new(1)));

        let done = session.tick(start + MAX_CONVERSION_DELAY);
        assert!(done.contains(&SessionEvent::OpportunitiesChanged));
        assert_eq!(session.opportunities().len(), 1);
    }
}
