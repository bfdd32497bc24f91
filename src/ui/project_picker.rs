use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Choose which project to edit.
pub struct ProjectPickerState {
    names: Vec<String>,
    filter: String,
    list_state: ListState,
    pub status: Option<String>,
}

pub enum ProjectPickerAction {
    Back,
    Pick(String),
}

impl ProjectPickerState {
    pub fn new(names: Vec<String>, preselect: Option<&str>) -> Self {
        let mut state = Self {
            names,
            filter: String::new(),
            list_state: ListState::default(),
            status: None,
        };
        let index = preselect
            .and_then(|name| state.names.iter().position(|n| n == name))
            .or_else(|| (!state.names.is_empty()).then_some(0));
        state.list_state.select(index);
        state
    }

    /// Names matching the typed filter, case-insensitively.
    pub fn visible(&self) -> Vec<&str> {
        let filter = self.filter.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().contains(&filter))
            .map(String::as_str)
            .collect()
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.reset_selection();
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        let index = (!self.visible().is_empty()).then_some(0);
        self.list_state.select(index);
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_name(&self) -> Option<String> {
        let visible = self.visible();
        self.list_state
            .selected()
            .and_then(|i| visible.get(i))
            .map(|name| name.to_string())
    }
}

pub fn render_project_picker<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectPickerState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ].as_ref())
        .split(frame.size());

    let filter = Paragraph::new(format!("{}|", state.filter))
        .block(Block::default().title("Select Project").borders(Borders::ALL));
    frame.render_widget(filter, chunks[0]);

    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .map(|name| ListItem::new(name.to_string()))
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let help = state
        .status
        .clone()
        .unwrap_or_else(|| "Type to filter | <Enter> Edit | <Esc> Back".to_string());
    let help = Paragraph::new(help).block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut ProjectPickerState) -> Result<Option<ProjectPickerAction>> {
    if let Event::Key(key) = event::read()? {
        state.status = None;
        match key.code {
            KeyCode::Esc => return Ok(Some(ProjectPickerAction::Back)),
            KeyCode::Enter => {
                if let Some(name) = state.selected_name() {
                    return Ok(Some(ProjectPickerAction::Pick(name)));
                }
            }
            KeyCode::Down => state.next(),
            KeyCode::Up => state.previous(),
            KeyCode::Backspace => state.pop_filter(),
            KeyCode::Char(c) => state.push_filter(c),
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["Atlas", "Beacon", "Atrium"].map(String::from).to_vec()
    }

    #[test]
    fn preselects_the_current_project() {
        let state = ProjectPickerState::new(names(), Some("Beacon"));
        assert_eq!(state.selected_name().as_deref(), Some("Beacon"));
    }

    #[test]
    fn filter_narrows_choices() {
        let mut state = ProjectPickerState::new(names(), None);
        state.push_filter('a');
        state.push_filter('t');
        assert_eq!(state.visible(), vec!["Atlas", "Atrium"]);

        state.next();
        assert_eq!(state.selected_name().as_deref(), Some("Atrium"));
        state.next();
        assert_eq!(state.selected_name().as_deref(), Some("Atlas"));
    }

    #[test]
    fn no_match_selects_nothing() {
        let mut state = ProjectPickerState::new(names(), None);
        state.push_filter('z');
        assert_eq!(state.selected_name(), None);
        state.pop_filter();
        assert_eq!(state.selected_name().as_deref(), Some("Atlas"));
    }
}
