// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use leadline_app::{
    EditField, FilterField, LeadField, LeadId, LeadQuery, LeadStatus, Opportunity, OpportunityId,
    OpportunityStage, RecordStore, Session, SessionCommand, SessionEvent, SessionOptions,
    SortDirection, derive_view,
};
use leadline_testkit::{LeadFaker, demo_leads, lead_fixture};
use std::time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(1500);

fn session_with(store: RecordStore) -> Session {
    Session::new(
        store,
        SessionOptions {
            conversion_delay: DELAY,
            initial_query: LeadQuery::default(),
        },
    )
}

#[test]
fn converting_acme_lead_produces_acme_deal() -> Result<()> {
    let store = RecordStore::new(
        vec![lead_fixture(1, "Jo", "Acme", 75, LeadStatus::New)],
        vec![],
    )?;
    let mut session = session_with(store);
    let start = Instant::now();

    session.dispatch_at(SessionCommand::Convert(LeadId::new(1)), start);
    let events = session.tick(start + DELAY);

    assert!(events.contains(&SessionEvent::OpportunitiesChanged));
    assert_eq!(
        session.opportunities(),
        &[Opportunity {
            id: OpportunityId::new(1),
            name: "Acme Deal".to_owned(),
            stage: OpportunityStage::Won,
            amount: Some(0.0),
            account_name: "Jo".to_owned(),
        }]
    );
    assert_eq!(session.leads()[0].status, LeadStatus::Converted);
    Ok(())
}

#[test]
fn new_opportunity_id_follows_existing_max() -> Result<()> {
    let existing = Opportunity {
        id: OpportunityId::new(9),
        name: "Older Deal".to_owned(),
        stage: OpportunityStage::Closed,
        amount: None,
        account_name: "Someone".to_owned(),
    };
    let store = RecordStore::new(
        vec![lead_fixture(1, "Jo", "Acme", 75, LeadStatus::Qualified)],
        vec![existing],
    )?;
    let mut session = session_with(store);
    let start = Instant::now();
    session.dispatch_at(SessionCommand::Convert(LeadId::new(1)), start);
    session.tick(start + DELAY);

    let ids: Vec<i64> = session.opportunities().iter().map(|o| o.id.get()).collect();
    assert_eq!(ids, vec![9, 10]);
    Ok(())
}

#[test]
fn search_and_status_filter_pick_single_lead() -> Result<()> {
    let store = RecordStore::new(
        vec![
            lead_fixture(1, "Jo", "Acme Corp", 70, LeadStatus::New),
            lead_fixture(2, "Al", "Globex", 70, LeadStatus::New),
        ],
        vec![],
    )?;
    let mut session = session_with(store);
    session.dispatch(SessionCommand::SetSearch("acme".to_owned()));
    session.dispatch(SessionCommand::ToggleStatusFilter(LeadStatus::New));

    let rows = session.visible_leads();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, LeadId::new(1));
    assert_eq!(session.count_label(), "1 of 2 leads");

    session.dispatch(SessionCommand::ClearFilter(FilterField::Status));
    session.dispatch(SessionCommand::SetSearch(String::new()));
    assert_eq!(session.visible_leads().len(), 2);
    Ok(())
}

#[test]
fn generated_views_hold_filter_and_sort_properties() {
    let leads = LeadFaker::new(11).leads(60);
    let mut query = LeadQuery::unsorted();
    query.search = "a".to_owned();
    query.sort_field = Some(LeadField::Score);

    let asc = derive_view(&leads, &query);
    for row in &asc {
        assert!(query.matches(row));
    }
    for pair in asc.windows(2) {
        assert!(pair[0].score <= pair[1].score);
        if pair[0].score == pair[1].score {
            assert!(pair[0].id < pair[1].id, "ties keep input order");
        }
    }

    query.sort_direction = SortDirection::Desc;
    let desc = derive_view(&leads, &query);
    assert_eq!(asc.len(), desc.len());
    for pair in desc.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        if pair[0].score == pair[1].score {
            assert!(pair[0].id < pair[1].id, "ties keep input order");
        }
    }
}

#[test]
fn edit_then_convert_flow_on_demo_data() -> Result<()> {
    let leads = demo_leads();
    let target = leads
        .iter()
        .find(|lead| lead.score >= 60 && lead.status == LeadStatus::New)
        .or_else(|| leads.iter().find(|lead| lead.score >= 60 && lead.status != LeadStatus::Unqualified))
        .map(|lead| lead.id)
        .expect("demo data has a convertible lead");
    let mut session = session_with(RecordStore::new(leads, vec![])?);

    session.dispatch(SessionCommand::BeginEdit {
        lead_id: target,
        field: EditField::Email,
    });
    session.dispatch(SessionCommand::EditInput("owner@example.org".to_owned()));
    let events = session.dispatch(SessionCommand::CommitEdit);
    assert!(matches!(events.as_slice(), [SessionEvent::EditCommitted(_)]));

    let start = Instant::now();
    session.dispatch_at(SessionCommand::Convert(target), start);
    session.tick(start + DELAY);

    let lead = session.store().lead(target).expect("lead kept");
    assert_eq!(lead.email, "owner@example.org");
    assert_eq!(lead.status, LeadStatus::Converted);
    assert_eq!(session.opportunities().len(), 1);
    assert_eq!(session.opportunities()[0].account_name, lead.name);
    Ok(())
}
