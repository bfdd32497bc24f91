use std::collections::BTreeSet;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::store::BulkDeleteReport;
use crate::ui::components::centered_rect;

/// Checklist of project names to delete in one go.
pub struct DeleteSelectState {
    names: Vec<String>,
    selected: BTreeSet<String>,
    list_state: ListState,
    show_delete_confirmation: bool,
    pub status: Option<String>,
}

pub enum DeleteSelectAction {
    Back,
    Delete(Vec<String>),
}

impl DeleteSelectState {
    pub fn new(names: Vec<String>) -> Self {
        let mut list_state = ListState::default();
        if !names.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            names,
            selected: BTreeSet::new(),
            list_state,
            show_delete_confirmation: false,
            status: None,
        }
    }

    pub fn next(&mut self) {
        if self.names.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.names.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.names.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.names.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_current(&mut self) {
        let Some(name) = self.list_state.selected().and_then(|i| self.names.get(i)) else {
            return;
        };
        if !self.selected.remove(name) {
            self.selected.insert(name.clone());
        }
    }

    pub fn selected(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn can_delete(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    /// Fold a bulk delete outcome back into the checklist.
    ///
    /// Deleted names disappear; names that failed stay selected for a retry.
    pub fn apply_report(&mut self, report: &BulkDeleteReport) {
        for name in &report.deleted {
            self.selected.remove(name);
        }
        self.names.retain(|name| !report.deleted.contains(name));

        let selected = self.list_state.selected().map(|i| i.min(self.names.len().saturating_sub(1)));
        self.list_state.select(selected.filter(|_| !self.names.is_empty()));

        self.status = if report.is_success() {
            Some(format!("Deleted {} project(s)", report.deleted.len()))
        } else {
            Some(format!("Failed to delete: {}", report.failed_names().join(", ")))
        };
    }
}

pub fn render_delete_select<B: Backend>(frame: &mut Frame<B>, state: &mut DeleteSelectState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let items: Vec<ListItem> = state
        .names
        .iter()
        .map(|name| {
            let mark = if state.selected.contains(name) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {name}"))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Delete From Projects").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state.list_state);

    let help = match &state.status {
        Some(status) => status.clone(),
        None if state.can_delete() => {
            format!("<Space> Toggle | <D> Delete Selected ({}) | <Esc> Back", state.selected.len())
        }
        None => "<Space> Toggle | <Esc> Back".to_string(),
    };
    let help = Paragraph::new(help).block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, chunks[1]);

    if state.show_delete_confirmation {
        let popup = Paragraph::new(vec![
            Spans::from(""),
            Spans::from(format!("Delete {} selected project(s)?", state.selected.len())),
            Spans::from(""),
            Spans::from("<Y> Yes  <N> No"),
        ])
        .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black));
        frame.render_widget(popup, centered_rect(50, 20, size));
    }
}

pub fn handle_input(state: &mut DeleteSelectState) -> Result<Option<DeleteSelectAction>> {
    if let Event::Key(key) = event::read()? {
        state.status = None;
        if state.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') => {
                    state.toggle_delete_confirmation();
                    return Ok(Some(DeleteSelectAction::Delete(state.selected())));
                }
                KeyCode::Char('n') | KeyCode::Esc => state.toggle_delete_confirmation(),
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(Some(DeleteSelectAction::Back)),
            KeyCode::Char(' ') => state.toggle_current(),
            KeyCode::Char('d') | KeyCode::Enter if state.can_delete() => {
                state.toggle_delete_confirmation();
            }
            KeyCode::Down => state.next(),
            KeyCode::Up => state.previous(),
            _ => {}
        }
    }
    Ok(None)
}
