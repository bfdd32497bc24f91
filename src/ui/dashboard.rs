use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tokio::sync::watch;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::milestones::Timeline;
use crate::models::{BudgetStatus, Project, ProjectStatus};
use crate::report::format_usd;
use crate::store::StoreSnapshot;
use crate::ui::components::centered_rect;

/// Main screen: the current project with its timeline and the page cursor.
pub struct DashboardState {
    snapshot: watch::Receiver<StoreSnapshot>,
    pub status: Option<String>,
    /// Project awaiting a yes/no before it is deleted.
    pub confirm_delete: Option<String>,
}

pub enum DashboardAction {
    Quit,
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    NewProject,
    EditProject,
    DeleteProjects,
    DeleteCurrent(String),
    PrintReport,
    Refresh,
}

impl DashboardState {
    pub fn new(snapshot: watch::Receiver<StoreSnapshot>) -> Self {
        Self {
            snapshot,
            status: None,
            confirm_delete: None,
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.borrow().clone()
    }
}

pub fn pagination_label(snapshot: &StoreSnapshot) -> String {
    let pagination = snapshot.pagination;
    match snapshot.current_project() {
        Some(project) => format!(
            "< {} / {} >  {}",
            pagination.current_page(),
            pagination.total_pages(),
            project.project_name
        ),
        None => "No projects".to_string(),
    }
}

fn status_style(status: ProjectStatus) -> Style {
    let color = match status {
        ProjectStatus::Finished => Color::Green,
        ProjectStatus::Ongoing => Color::Yellow,
    };
    Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
}

fn budget_style(status: BudgetStatus) -> Style {
    match status {
        BudgetStatus::OverBudget => Style::default().fg(Color::Red),
        BudgetStatus::WithinBudget => Style::default().fg(Color::Green),
        BudgetStatus::Unknown => Style::default(),
    }
}

fn heading(text: &str) -> Spans<'static> {
    Spans::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn detail_lines(project: &Project) -> Vec<Spans<'static>> {
    let budget = budget_style(project.budget_status());
    vec![
        Spans::from(vec![
            Span::styled(
                project.project_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(project.code.clone(), Style::default().fg(Color::Gray)),
        ]),
        Spans::from(""),
        heading("Overview"),
        Spans::from(project.overview.clone()),
        Spans::from(""),
        heading("Project Scope"),
        Spans::from(project.project_scope.clone()),
        heading("Project Goals"),
        Spans::from(format!("- {}", project.project_goals_1)),
        Spans::from(format!("- {}", project.project_goals_2)),
        Spans::from(""),
        heading("Business Team"),
        Spans::from(format!("Exec, Sponsor: {}", project.exec_sponsor)),
        Spans::from(format!("Business Product: {}", project.business_product)),
        Spans::from(format!("Process Owner: {}", project.process_owner)),
        heading("HUB Team"),
        Spans::from(format!("PM: {}", project.pm)),
        Spans::from(format!("Dev: {}", project.dev)),
        heading("Risk & Issues"),
        Spans::from(project.risk.clone()),
        heading("HUB Project Budget"),
        Spans::from(vec![
            Span::raw("Actual  "),
            Span::styled(format_usd(project.budget_actual_usd), budget),
        ]),
        Spans::from(vec![
            Span::raw("Planned "),
            Span::raw(format_usd(project.budget_planned_usd)),
        ]),
    ]
}

/// The end slot of a finished project is highlighted; empty slots are dimmed.
fn slot_style(timeline: &Timeline, slot: usize) -> Style {
    let last = timeline.entries.len() - 1;
    if slot == last && timeline.is_finished {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if timeline.entries[slot].is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn timeline_items(timeline: &Timeline) -> Vec<ListItem<'static>> {
    timeline
        .labelled()
        .enumerate()
        .map(|(slot, (label, date))| {
            let marker = if date.is_empty() { "o" } else { "*" };
            let style = slot_style(timeline, slot);
            ListItem::new(vec![
                Spans::from(Span::styled(format!("{marker} {label}"), style)),
                Spans::from(Span::styled(format!("  {date}"), style)),
            ])
        })
        .collect()
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let snapshot = state.snapshot();
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ].as_ref())
        .split(size);

    render_header(frame, &snapshot, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)].as_ref())
        .split(chunks[1]);

    let details = match snapshot.current_project() {
        Some(project) => detail_lines(project),
        None => vec![Spans::from("No project selected. Press <N> to add one.")],
    };
    let details = Paragraph::new(details)
        .block(Block::default().title("Project").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(details, body[0]);

    let milestones = List::new(timeline_items(&snapshot.timeline()))
        .block(Block::default().title("MILESTONES").borders(Borders::ALL));
    frame.render_widget(milestones, body[1]);

    let footer_text = match &state.status {
        Some(status) => status.clone(),
        None => format!(
            "{}   | <Left/Right> Page | <N> New | <E> Edit | <X> Delete This | <D> Delete | <P> Print | <R> Refresh | <Q> Quit",
            pagination_label(&snapshot)
        ),
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(footer, chunks[2]);

    if let Some(name) = &state.confirm_delete {
        let area = centered_rect(50, 20, size);
        let popup = Paragraph::new(vec![
            Spans::from(""),
            Spans::from(format!("Delete project {name}?")),
            Spans::from(""),
            Spans::from("<Y> Yes  <N> No"),
        ])
        .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black));
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

fn render_header<B: Backend>(frame: &mut Frame<B>, snapshot: &StoreSnapshot, area: Rect) {
    let mut spans = Vec::new();
    if let Some(project) = snapshot.current_project() {
        let status = project.status();
        spans.push(Span::styled(format!(" {status} "), status_style(status)));
        spans.push(Span::raw("  "));
    }
    if snapshot.loading {
        spans.push(Span::styled("Loading...", Style::default().fg(Color::Yellow)));
    } else if let Some(error) = &snapshot.error {
        spans.push(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(Spans::from(spans))
        .block(Block::default().title("Project Tracker").borders(Borders::ALL));
    frame.render_widget(header, area);
}

pub fn handle_input(state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        state.status = None;
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

fn handle_key(state: &mut DashboardState, code: KeyCode) -> Option<DashboardAction> {
    if let Some(name) = state.confirm_delete.take() {
        return match code {
            KeyCode::Char('y') => Some(DashboardAction::DeleteCurrent(name)),
            _ => None,
        };
    }

    let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => DashboardAction::Quit,
            KeyCode::Left => DashboardAction::PreviousPage,
            KeyCode::Right => DashboardAction::NextPage,
            KeyCode::Home => DashboardAction::FirstPage,
            KeyCode::End => DashboardAction::LastPage,
            KeyCode::Char('n') => DashboardAction::NewProject,
            KeyCode::Char('e') => DashboardAction::EditProject,
        KeyCode::Char('d') => DashboardAction::DeleteProjects,
        KeyCode::Char('x') => {
            let snapshot = state.snapshot();
            state.confirm_delete = snapshot.current_project().map(|p| p.project_name.clone());
            return None;
        }
        KeyCode::Char('p') => DashboardAction::PrintReport,
        KeyCode::Char('r') => DashboardAction::Refresh,
        _ => return None,
    };
    Some(action)
}
