// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use leadline_app::{
    ConversionRejection, EditField, FilterField, Lead, LeadField, LeadId, LeadStatus, Opportunity,
    Session, SessionCommand, SessionEvent, SortDirection, TabKind,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const EDIT_CURSOR: &str = "▏";
const OPPORTUNITY_COLUMNS: [&str; 5] = ["ID", "Name", "Stage", "Amount", "Account"];

/// Statuses reachable from the inline status editor.
const EDITABLE_STATUSES: [LeadStatus; 4] = [
    LeadStatus::New,
    LeadStatus::Contacted,
    LeadStatus::Qualified,
    LeadStatus::Unqualified,
];

pub trait AppRuntime {
    fn persist_opportunities(&mut self, opportunities: &[Opportunity]) -> Result<()>;
}

pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Nav,
    Search,
    FilterPicker(FilterField),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    mode: InputMode,
    selected_row: usize,
    selected_col: usize,
    filter_cursor: usize,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(session: &mut Session, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(session, &mut view_data, &internal_rx);
        on_tick(
            session,
            runtime,
            &mut view_data,
            &internal_tx,
            Instant::now(),
        );

        if let Err(error) = terminal.draw(|frame| render(frame, session, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(POLL_INTERVAL).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(session, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    session: &mut Session,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                session.dispatch(SessionCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn on_tick<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    now: Instant,
) {
    let events = session.tick(now);
    apply_events(session, runtime, view_data, internal_tx, events);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    session: &mut Session,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    session.dispatch(SessionCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn dispatch<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: SessionCommand,
) {
    let events = session.dispatch(command);
    apply_events(session, runtime, view_data, internal_tx, events);
}

fn apply_events<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<SessionEvent>,
) {
    for event in events {
        match event {
            SessionEvent::OpportunitiesChanged => {
                if let Err(error) = runtime.persist_opportunities(session.opportunities()) {
                    warn!(error = %format!("{error:#}"), "persisting opportunities failed");
                    emit_status(
                        session,
                        view_data,
                        internal_tx,
                        format!("save failed: {error}; check storage.db_path is writable"),
                    );
                }
            }
            SessionEvent::StatusUpdated(_) => bump_status_token(view_data, internal_tx),
            SessionEvent::EditCommitted(commit) => {
                emit_status(
                    session,
                    view_data,
                    internal_tx,
                    format!("{} updated to {}", commit.field.label(), commit.value),
                );
            }
            SessionEvent::ConversionRejected(rejection) => {
                emit_status(session, view_data, internal_tx, rejection.to_string());
            }
            SessionEvent::DetailsSuppressed => {
                emit_status(session, view_data, internal_tx, "finish or cancel the edit first");
            }
            SessionEvent::TabChanged(_) | SessionEvent::QueryChanged => {
                view_data.selected_row = 0;
            }
            _ => {}
        }
    }
    clamp_selection(session, view_data);
}

fn handle_key_event<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if session.edit().is_editing() {
        handle_edit_key(session, runtime, view_data, internal_tx, key);
        return false;
    }

    match view_data.mode {
        InputMode::Search => {
            handle_search_key(session, runtime, view_data, internal_tx, key);
            return false;
        }
        InputMode::FilterPicker(field) => {
            handle_filter_picker_key(session, runtime, view_data, internal_tx, field, key);
            return false;
        }
        InputMode::Nav => {}
    }

    if session.details_lead().is_some() {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
        ) {
            dispatch(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::CloseDetails,
            );
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab => dispatch(
            session,
            runtime,
            view_data,
            internal_tx,
            SessionCommand::NextTab,
        ),
        KeyCode::Char('j') | KeyCode::Down => move_row(session, view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(session, view_data, -1),
        KeyCode::Char('g') => view_data.selected_row = 0,
        KeyCode::Char('G') => {
            view_data.selected_row = row_count(session).saturating_sub(1);
        }
        KeyCode::Esc => {
            if session.status_line().is_some() {
                session.dispatch(SessionCommand::ClearStatus);
            }
        }
        _ if session.active_tab() == TabKind::Leads => {
            handle_leads_nav_key(session, runtime, view_data, internal_tx, key);
        }
        _ => {}
    }
    false
}

fn handle_leads_nav_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            view_data.selected_col = (view_data.selected_col + 1).min(LeadField::ALL.len() - 1);
        }
        KeyCode::Char('s') => {
            let field = LeadField::ALL[view_data.selected_col];
            dispatch(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SortBy(field),
            );
        }
        KeyCode::Char('/') => view_data.mode = InputMode::Search,
        KeyCode::Char('f') => open_filter_picker(view_data, FilterField::Source),
        KeyCode::Char('F') => open_filter_picker(view_data, FilterField::Status),
        KeyCode::Char('e') => begin_edit(session, runtime, view_data, internal_tx, EditField::Email),
        KeyCode::Char('t') => {
            begin_edit(session, runtime, view_data, internal_tx, EditField::Status);
        }
        KeyCode::Char('i') => match LeadField::ALL[view_data.selected_col] {
            LeadField::Email => {
                begin_edit(session, runtime, view_data, internal_tx, EditField::Email);
            }
            LeadField::Status => {
                begin_edit(session, runtime, view_data, internal_tx, EditField::Status);
            }
            _ => emit_status(
                session,
                view_data,
                internal_tx,
                "only email and status are editable",
            ),
        },
        KeyCode::Enter => {
            if let Some(lead_id) = selected_lead_id(session, view_data) {
                dispatch(
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::OpenDetails(lead_id),
                );
            }
        }
        KeyCode::Char('c') => {
            if let Some(lead_id) = selected_lead_id(session, view_data) {
                dispatch(
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::Convert(lead_id),
                );
            }
        }
        _ => {}
    }
}

fn begin_edit<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: EditField,
) {
    let Some(lead_id) = selected_lead_id(session, view_data) else {
        return;
    };
    dispatch(
        session,
        runtime,
        view_data,
        internal_tx,
        SessionCommand::BeginEdit { lead_id, field },
    );
}

fn handle_edit_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(edit) = session.edit().session() else {
        return;
    };
    let field = edit.field;
    let mut candidate = edit.candidate.clone();

    match key.code {
        KeyCode::Esc => {
            dispatch(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::CancelEdit,
            );
            return;
        }
        KeyCode::Enter => {
            dispatch(
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::CommitEdit,
            );
            return;
        }
        KeyCode::Tab if field == EditField::Status => {
            candidate = next_editable_status(&candidate).as_str().to_owned();
        }
        KeyCode::Backspace => {
            candidate.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            candidate.clear();
        }
        KeyCode::Char(ch) => candidate.push(ch),
        _ => return,
    }
    session.dispatch(SessionCommand::EditInput(candidate));
}

fn next_editable_status(candidate: &str) -> LeadStatus {
    let current = EDITABLE_STATUSES
        .iter()
        .position(|status| status.as_str() == candidate.trim());
    match current {
        Some(index) => EDITABLE_STATUSES[(index + 1) % EDITABLE_STATUSES.len()],
        None => EDITABLE_STATUSES[0],
    }
}

fn handle_search_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut search = session.query().search.clone();
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.mode = InputMode::Nav;
            return;
        }
        KeyCode::Backspace => {
            search.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => search.clear(),
        KeyCode::Char(ch) => search.push(ch),
        _ => return,
    }
    dispatch(
        session,
        runtime,
        view_data,
        internal_tx,
        SessionCommand::SetSearch(search),
    );
}

fn open_filter_picker(view_data: &mut ViewData, field: FilterField) {
    view_data.mode = InputMode::FilterPicker(field);
    view_data.filter_cursor = 0;
}

fn filter_option_labels(session: &Session, field: FilterField) -> Vec<(String, bool)> {
    let query = session.query();
    match field {
        FilterField::Source => session
            .source_options()
            .into_iter()
            .map(|source| {
                let selected = query.sources.contains(&source);
                (source, selected)
            })
            .collect(),
        FilterField::Status => session
            .status_options()
            .into_iter()
            .map(|status| (status.as_str().to_owned(), query.statuses.contains(&status)))
            .collect(),
    }
}

fn handle_filter_picker_key<R: AppRuntime>(
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: FilterField,
    key: KeyEvent,
) {
    let options = filter_option_labels(session, field);
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => view_data.mode = InputMode::Nav,
        KeyCode::Char('j') | KeyCode::Down => {
            if view_data.filter_cursor + 1 < options.len() {
                view_data.filter_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.filter_cursor = view_data.filter_cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let Some((value, _)) = options.get(view_data.filter_cursor) else {
                return;
            };
            let command = match field {
                FilterField::Source => SessionCommand::ToggleSourceFilter(value.clone()),
                FilterField::Status => match LeadStatus::parse(value) {
                    Some(status) => SessionCommand::ToggleStatusFilter(status),
                    None => return,
                },
            };
            dispatch(session, runtime, view_data, internal_tx, command);
        }
        KeyCode::Char('c') => dispatch(
            session,
            runtime,
            view_data,
            internal_tx,
            SessionCommand::ClearFilter(field),
        ),
        _ => {}
    }
}

fn row_count(session: &Session) -> usize {
    match session.active_tab() {
        TabKind::Leads => session.visible_leads().len(),
        TabKind::Opportunities => session.opportunities().len(),
    }
}

fn move_row(session: &Session, view_data: &mut ViewData, delta: isize) {
    let count = row_count(session);
    if count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = view_data.selected_row.saturating_add_signed(delta);
    view_data.selected_row = next.min(count - 1);
}

fn clamp_selection(session: &Session, view_data: &mut ViewData) {
    let count = row_count(session);
    if view_data.selected_row >= count {
        view_data.selected_row = count.saturating_sub(1);
    }
}

fn selected_lead_id(session: &Session, view_data: &ViewData) -> Option<LeadId> {
    if session.active_tab() != TabKind::Leads {
        return None;
    }
    session
        .visible_leads()
        .get(view_data.selected_row)
        .map(|lead| lead.id)
}

fn render(frame: &mut ratatui::Frame<'_>, session: &Session, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == session.active_tab())
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, session))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("leadline").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match session.active_tab() {
        TabKind::Leads => render_leads_table(frame, layout[1], session, view_data),
        TabKind::Opportunities => render_opportunity_table(frame, layout[1], session, view_data),
    }

    let status_widget = Paragraph::new(status_text(session, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let InputMode::FilterPicker(field) = view_data.mode {
        let area = centered_rect(40, 50, frame.area());
        frame.render_widget(Clear, area);
        let picker = Paragraph::new(filter_picker_text(session, field, view_data.filter_cursor))
            .block(
                Block::default()
                    .title(format!("filter by {}", field.label()))
                    .borders(Borders::ALL),
            );
        frame.render_widget(picker, area);
    }

    if let Some(lead) = session.details_lead() {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let details = Paragraph::new(details_text(lead)).block(
            Block::default()
                .title("lead details")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(details, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_leads_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    session: &Session,
    view_data: &ViewData,
) {
    let mut widths = LeadField::ALL
        .iter()
        .map(|field| match field {
            LeadField::Id | LeadField::Score => Constraint::Length(6),
            LeadField::Status => Constraint::Length(12),
            _ => Constraint::Min(10),
        })
        .collect::<Vec<_>>();
    widths.push(Constraint::Length(14));

    let mut header_cells = LeadField::ALL
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let mut style = Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD);
            if index == view_data.selected_col {
                style = style.fg(Color::Cyan);
            }
            Cell::from(header_label(*field, session)).style(style)
        })
        .collect::<Vec<_>>();
    header_cells.push(Cell::from("Action").style(Style::default().add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells);

    let rows = session
        .visible_leads()
        .into_iter()
        .enumerate()
        .map(|(row_index, lead)| {
            let selected_row = row_index == view_data.selected_row;
            let cells = lead_row_cells(session, lead)
                .into_iter()
                .enumerate()
                .map(|(column_index, text)| {
                    let mut style = Style::default();
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row && column_index == view_data.selected_col {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(text).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        })
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(session.count_label())
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn render_opportunity_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    session: &Session,
    view_data: &ViewData,
) {
    let widths = vec![Constraint::Min(8); OPPORTUNITY_COLUMNS.len()];
    let header = Row::new(OPPORTUNITY_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let rows = session
        .opportunities()
        .iter()
        .enumerate()
        .map(|(row_index, opportunity)| {
            let style = if row_index == view_data.selected_row {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(opportunity_row_cells(opportunity)).style(style)
        })
        .collect::<Vec<_>>();

    let title = if session.opportunities().is_empty() {
        "no opportunities yet; convert a lead with c".to_owned()
    } else {
        format!("{} opportunities", session.opportunities().len())
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn tab_title(tab: TabKind, session: &Session) -> String {
    match tab {
        TabKind::Leads => format!(
            "{} ({}/{})",
            tab.label(),
            session.visible_leads().len(),
            session.leads().len()
        ),
        TabKind::Opportunities => format!("{} ({})", tab.label(), session.opportunities().len()),
    }
}

fn header_label(field: LeadField, session: &Session) -> String {
    let query = session.query();
    let mut label = field.label().to_owned();
    if query.sort_field == Some(field) {
        label.push(' ');
        label.push_str(match query.sort_direction {
            SortDirection::Asc => SORT_MARK_ASC,
            SortDirection::Desc => SORT_MARK_DESC,
        });
    }
    let filter = match field {
        LeadField::Source => Some(FilterField::Source),
        LeadField::Status => Some(FilterField::Status),
        _ => None,
    };
    if let Some(filter) = filter {
        let count = query.filter_count(filter);
        if count > 0 {
            label.push_str(&format!(" [{count}]"));
        }
    }
    label
}

fn lead_row_cells(session: &Session, lead: &Lead) -> Vec<String> {
    let mut cells = LeadField::ALL
        .iter()
        .map(|field| lead_cell_text(session, lead, *field))
        .collect::<Vec<_>>();
    cells.push(action_label(session, lead).to_owned());
    cells
}

fn lead_cell_text(session: &Session, lead: &Lead, field: LeadField) -> String {
    let edit_field = match field {
        LeadField::Email => Some(EditField::Email),
        LeadField::Status => Some(EditField::Status),
        _ => None,
    };
    if let Some(edit_field) = edit_field
        && session.edit().is_editing_cell(lead.id, edit_field)
        && let Some(edit) = session.edit().session()
    {
        return format!("{}{EDIT_CURSOR}", edit.candidate);
    }

    match field {
        LeadField::Id => lead.id.to_string(),
        LeadField::Name => lead.name.clone(),
        LeadField::Company => lead.company.clone(),
        LeadField::Email => lead.email.clone(),
        LeadField::Source => lead.source.clone(),
        LeadField::Score => lead.score.to_string(),
        LeadField::Status => lead.status.label().to_owned(),
    }
}

fn action_label(session: &Session, lead: &Lead) -> &'static str {
    if session
        .pending_conversion()
        .is_some_and(|pending| pending.lead_id() == lead.id)
    {
        return "converting...";
    }
    match session.can_convert(lead.id) {
        Ok(()) => "convert",
        Err(ConversionRejection::Busy) => "wait",
        Err(_) if lead.status == LeadStatus::Converted => "converted",
        Err(_) => "-",
    }
}

fn opportunity_row_cells(opportunity: &Opportunity) -> Vec<String> {
    vec![
        opportunity.id.to_string(),
        opportunity.name.clone(),
        opportunity.stage.as_str().to_owned(),
        format_amount(opportunity.amount),
        opportunity.account_name.clone(),
    ]
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map(|value| format!("${value:.2}")).unwrap_or_default()
}

fn details_text(lead: &Lead) -> String {
    let tier = lead.score_tier();
    [
        format!("name: {}", lead.name),
        format!("company: {}", lead.company),
        format!("email: {}", lead.email),
        format!("source: {}", lead.source),
        format!("status: {}", lead.status.label()),
        format!("score: {}", lead.score),
        String::new(),
        tier.summary().to_owned(),
        String::new(),
        "esc close".to_owned(),
    ]
    .join("\n")
}

fn filter_picker_text(session: &Session, field: FilterField, cursor: usize) -> String {
    let options = filter_option_labels(session, field);
    if options.is_empty() {
        return "no values".to_owned();
    }
    let mut lines = options
        .iter()
        .enumerate()
        .map(|(index, (label, selected))| {
            let pointer = if index == cursor { ">" } else { " " };
            let mark = if *selected { "x" } else { " " };
            format!("{pointer} [{mark}] {label}")
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("space toggle | c clear | esc close".to_owned());
    lines.join("\n")
}

fn status_text(session: &Session, view_data: &ViewData) -> String {
    if let Some(edit) = session.edit().session() {
        let hint = match edit.field {
            EditField::Email => "enter save | esc cancel | ctrl+u clear",
            EditField::Status => "tab cycle | enter save | esc cancel",
        };
        return format!("editing {}: {hint}", edit.field.label());
    }
    if view_data.mode == InputMode::Search {
        return format!("search: {}{EDIT_CURSOR}", session.query().search);
    }
    if let Some(message) = session.status_line() {
        return message.to_owned();
    }
    if let Some(pending) = session.pending_conversion() {
        return format!("converting {}...", pending.lead().name);
    }
    match session.active_tab() {
        TabKind::Leads => {
            "j/k rows | h/l cols | s sort | / search | f/F filter | e/t edit | enter details | c convert | tab switch | ? help".to_owned()
        }
        TabKind::Opportunities => "j/k rows | tab switch | ? help | q quit".to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "global: q or ctrl+q quit | tab switch view | ? help | esc dismiss message\n\
nav: j/k rows | g/G first/last | h/l columns\n\
leads: s sort by column (again to flip) | / search name, company, email\n\
leads: f source filter | F status filter | enter details | c convert\n\
edit: e email | t status | i selected cell | enter save | esc cancel\n\
filter picker: j/k move | space toggle | c clear | esc close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
