// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::{Lead, LeadId, LeadStatus, RecordStore};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Email,
    Status,
}

impl EditField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Status => "status",
        }
    }

    pub fn current_value(self, lead: &Lead) -> String {
        match self {
            Self::Email => lead.email.clone(),
            Self::Status => lead.status.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub lead_id: LeadId,
    pub field: EditField,
    pub candidate: String,
    pub original: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    pub lead_id: LeadId,
    pub field: EditField,
    pub previous: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("please enter a valid email address (got {value:?})")]
    InvalidEmail { value: String },
    #[error("unknown status {value:?} -- choose new, contacted, qualified, or unqualified")]
    UnknownStatus { value: String },
    #[error("leads become converted only through conversion")]
    ConversionOnly,
    #[error("lead {0} no longer exists")]
    UnknownLead(LeadId),
    #[error("no edit in progress")]
    NotEditing,
}

/// Inline edit state. At most one cell is ever being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            Self::Idle => None,
            Self::Editing(session) => Some(session),
        }
    }

    pub fn is_editing_cell(&self, lead_id: LeadId, field: EditField) -> bool {
        self.session()
            .is_some_and(|session| session.lead_id == lead_id && session.field == field)
    }

    /// Starts editing a cell. Any prior session is cancelled and returned.
    pub fn begin(&mut self, lead: &Lead, field: EditField) -> Option<EditSession> {
        let value = field.current_value(lead);
        let previous = self.cancel();
        debug!(lead_id = %lead.id, field = field.label(), "edit started");
        *self = Self::Editing(EditSession {
            lead_id: lead.id,
            field,
            candidate: value.clone(),
            original: value,
        });
        previous
    }

    pub fn input(&mut self, value: impl Into<String>) -> bool {
        match self {
            Self::Idle => false,
            Self::Editing(session) => {
                session.candidate = value.into();
                true
            }
        }
    }

    pub fn cancel(&mut self) -> Option<EditSession> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing(session) => {
                debug!(lead_id = %session.lead_id, field = session.field.label(), "edit cancelled");
                Some(session)
            }
        }
    }

    /// Validates and applies the candidate. The session ends either way; a
    /// rejected candidate leaves the record untouched.
    pub fn commit(&mut self, store: &mut RecordStore) -> Result<EditCommit, EditError> {
        let Self::Editing(session) = std::mem::take(self) else {
            return Err(EditError::NotEditing);
        };
        let lead = store
            .lead_mut(session.lead_id)
            .ok_or(EditError::UnknownLead(session.lead_id))?;

        let previous = session.field.current_value(lead);
        match session.field {
            EditField::Email => {
                if !is_valid_email(&session.candidate) {
                    return Err(EditError::InvalidEmail {
                        value: session.candidate,
                    });
                }
                lead.email = session.candidate.clone();
            }
            EditField::Status => {
                let status = LeadStatus::parse(session.candidate.trim()).ok_or_else(|| {
                    EditError::UnknownStatus {
                        value: session.candidate.clone(),
                    }
                })?;
                if status == LeadStatus::Converted && lead.status != LeadStatus::Converted {
                    return Err(EditError::ConversionOnly);
                }
                lead.status = status;
            }
        }

        let value = session.field.current_value(lead);
        debug!(lead_id = %session.lead_id, field = session.field.label(), "edit committed");
        Ok(EditCommit {
            lead_id: session.lead_id,
            field: session.field,
            previous,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EditError, EditField, EditState, is_valid_email};
    use crate::{Lead, LeadId, LeadStatus, RecordStore};

    fn store() -> RecordStore {
        let lead = |id: i64, email: &str| Lead {
            id: LeadId::new(id),
            name: format!("Lead {id}"),
            company: "Acme".to_owned(),
            email: email.to_owned(),
            source: "web".to_owned(),
            score: 70,
            status: LeadStatus::New,
        };
        RecordStore::new(vec![lead(1, "one@acme.com"), lead(2, "two@acme.com")], vec![])
            .expect("valid store")
    }

    fn lead(store: &RecordStore, id: i64) -> Lead {
        store.lead(LeadId::new(id)).cloned().expect("lead exists")
    }

    #[test]
    fn email_pattern_requires_local_domain_and_tld() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn begin_captures_original_value() {
        let store = store();
        let mut edit = EditState::default();
        assert!(edit.begin(&lead(&store, 1), EditField::Email).is_none());

        let session = edit.session().expect("editing");
        assert_eq!(session.original, "one@acme.com");
        assert_eq!(session.candidate, "one@acme.com");
        assert!(edit.is_editing_cell(LeadId::new(1), EditField::Email));
    }

    #[test]
    fn begin_on_another_cell_cancels_prior_session() {
        let mut store = store();
        let mut edit = EditState::default();
        edit.begin(&lead(&store, 1), EditField::Email);
        edit.input("typed@acme.com");

        let cancelled = edit
            .begin(&lead(&store, 2), EditField::Status)
            .expect("prior session returned");
        assert_eq!(cancelled.lead_id, LeadId::new(1));
        assert_eq!(cancelled.candidate, "typed@acme.com");
        assert!(edit.is_editing_cell(LeadId::new(2), EditField::Status));

        edit.cancel();
        assert_eq!(lead(&store, 1).email, "one@acme.com");
        assert!(matches!(edit.commit(&mut store), Err(EditError::NotEditing)));
    }

    #[test]
    fn valid_email_commit_updates_only_target() {
        let mut store = store();
        let mut edit = EditState::default();
        edit.begin(&lead(&store, 2), EditField::Email);
        edit.input("new@globex.com");

        let commit = edit.commit(&mut store).expect("valid email commits");
        assert_eq!(commit.previous, "two@acme.com");
        assert_eq!(commit.value, "new@globex.com");
        assert_eq!(lead(&store, 2).email, "new@globex.com");
        assert_eq!(lead(&store, 1).email, "one@acme.com");
        assert!(!edit.is_editing());
    }

    #[test]
    fn invalid_email_commit_is_rejected_and_returns_to_idle() {
        let mut store = store();
        let before = store.clone();
        let mut edit = EditState::default();
        edit.begin(&lead(&store, 1), EditField::Email);
        edit.input("not-an-email");

        let error = edit.commit(&mut store).expect_err("invalid email rejected");
        assert!(matches!(error, EditError::InvalidEmail { .. }));
        assert!(error.to_string().contains("valid email"));
        assert_eq!(store, before);
        assert_eq!(edit, EditState::Idle);
    }

    #[test]
    fn cancel_leaves_store_unchanged() {
        let mut store = store();
        let before = store.clone();
        let mut edit = EditState::default();
        edit.begin(&lead(&store, 1), EditField::Status);
        edit.input("qualified");
        assert!(edit.cancel().is_some());
        assert!(matches!(edit.commit(&mut store), Err(EditError::NotEditing)));
        assert_eq!(store, before);
    }

    #[test]
    fn status_commit_parses_known_values() {
        let mut store = store();
        let mut edit = EditState::default();
        edit.begin(&lead(&store, 1), EditField::Status);
        edit.input(" qualified ");
        edit.commit(&mut store).expect("status commits");
        assert_eq!(lead(&store, 1).status, LeadStatus::Qualified);

        edit.begin(&lead(&store, 1), EditField::Status);
        edit.input("hot");
        assert!(matches!(
            edit.commit(&mut store),
            Err(EditError::UnknownStatus { .. })
        ));
        assert_eq!(lead(&store, 1).status, LeadStatus::Qualified);
    }

    #[test]
    fn status_commit_refuses_converted() {
        let mut store = store();
        let mut edit = EditState::default();
        edit.begin(&lead(&store, 1), EditField::Status);
        edit.input("converted");
        assert_eq!(edit.commit(&mut store), Err(EditError::ConversionOnly));
        assert_eq!(lead(&store, 1).status, LeadStatus::New);
    }

    #[test]
    fn input_while_idle_is_ignored() {
        let mut edit = EditState::default();
        assert!(!edit.input("x"));
        assert_eq!(edit, EditState::Idle);
    }
}
