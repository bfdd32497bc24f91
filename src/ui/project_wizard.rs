use std::collections::BTreeSet;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::milestones::{min_selectable_date, parse_date};
use crate::models::{Field, Project, ProjectForm};
use crate::ui::components::date_input::DateInputState;
use crate::validator::{is_field_required, validate_project_form, FieldErrors};

pub enum ProjectWizardAction {
    Cancel,
    Submit(ProjectForm),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardMode {
    Create,
    /// Editing the project stored under `original_name`.
    Edit { original_name: String },
}

pub struct ProjectWizardState {
    pub mode: WizardMode,
    pub form: ProjectForm,
    initial: ProjectForm,
    pub current_field: Field,
    pub editing: bool,
    date_state: Option<DateInputState>,
    /// Value of the field before the current edit began.
    edit_backup: Option<Option<String>>,
    touched: BTreeSet<Field>,
    submitted: bool,
    errors: FieldErrors,
    pub status: Option<String>,
    today: NaiveDate,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self::with_today(WizardMode::Create, ProjectForm::new(), today())
    }

    pub fn from_existing(project: &Project) -> Self {
        Self::with_today(
            WizardMode::Edit {
                original_name: project.project_name.clone(),
            },
            ProjectForm::from_project(project),
            today(),
        )
    }

    pub fn with_today(mode: WizardMode, form: ProjectForm, today: NaiveDate) -> Self {
        let errors = validate_project_form(&form);
        Self {
            mode,
            initial: form.clone(),
            form,
            current_field: Field::ProjectName,
            editing: false,
            date_state: None,
            edit_backup: None,
            touched: BTreeSet::new(),
            submitted: false,
            errors,
            status: None,
            today,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            WizardMode::Create => "New Project",
            WizardMode::Edit { .. } => "Edit Project",
        }
    }

    pub fn toggle_editing(&mut self) {
        if self.editing {
            // An untouched date editor leaves the slot as it was
            if let Some(date_state) = self.date_state.take() {
                if date_state.dirty {
                    self.form.set(self.current_field, date_state.value());
                }
            }
            self.editing = false;
            self.edit_backup = None;
            self.touched.insert(self.current_field);
            self.revalidate();
            return;
        }

        self.edit_backup = Some(self.form.get(self.current_field).map(str::to_string));

        if let Some(slot) = self.current_field.milestone_slot() {
            let min = min_selectable_date(&self.form, slot, self.today);
            let existing = self.form.get(self.current_field).and_then(parse_date);
            let mut date_state = DateInputState::new(existing, min);
            date_state.toggle_editing();
            self.date_state = Some(date_state);
        }
        self.editing = true;
    }

    /// Leave the editor and restore the value the field had before.
    pub fn cancel_editing(&mut self) {
        if !self.editing {
            return;
        }
        self.date_state = None;
        match self.edit_backup.take() {
            Some(Some(value)) => self.form.set(self.current_field, value),
            Some(None) => {
                self.form.remove(self.current_field);
            }
            None => {}
        }
        self.editing = false;
        self.revalidate();
    }

    pub fn next_field(&mut self) {
        self.current_field = self.current_field.next();
    }

    pub fn previous_field(&mut self) {
        self.current_field = self.current_field.previous();
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        if let Some(date_state) = &mut self.date_state {
            date_state.handle_input(key);
            return;
        }

        let field = self.current_field;
        match key {
            KeyCode::Char(c) if field.is_numeric() => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    self.form.push_char(field, c);
                }
            }
            KeyCode::Char(c) => self.form.push_char(field, c),
            KeyCode::Backspace => self.form.pop_char(field),
            _ => {}
        }
    }

    /// Blank the selected field; a blank milestone or budget clears the stored value.
    pub fn clear_current_field(&mut self) {
        if self.editing {
            return;
        }
        self.form.set(self.current_field, "");
        self.touched.insert(self.current_field);
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.errors = validate_project_form(&self.form);
    }

    /// Errors reported by the store, e.g. a duplicate name.
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.submitted = true;
        self.errors = errors;
    }

    /// Error for `field`, shown once it was touched or a submit was attempted.
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.submitted || self.touched.contains(&field) {
            self.errors.get(&field).map(String::as_str)
        } else {
            None
        }
    }

    pub fn is_unchanged(&self, field: Field) -> bool {
        matches!(self.mode, WizardMode::Edit { .. }) && self.initial.get(field) == self.form.get(field)
    }

    pub fn submit(&mut self) -> Option<ProjectWizardAction> {
        self.submitted = true;
        self.revalidate();
        if self.errors.is_empty() {
            Some(ProjectWizardAction::Submit(self.form.clone()))
        } else {
            self.status = Some(format!("{} field(s) need attention", self.errors.len()));
            None
        }
    }

    fn display_value(&self, field: Field) -> String {
        if self.editing && field == self.current_field {
            if let Some(date_state) = &self.date_state {
                return date_state.get_display_string();
            }
            return format!("{}|", self.form.get(field).unwrap_or_default());
        }
        self.form.get(field).unwrap_or_default().to_string()
    }
}

impl Default for ProjectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = match &state.mode {
        WizardMode::Create => state.title().to_string(),
        WizardMode::Edit { original_name } => format!("{} - {}", state.title(), original_name),
    };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = match (&state.status, state.editing) {
        (Some(status), false) => status.clone(),
        (_, true) if state.date_state.is_some() => {
            "Digits - Type date part | Left/Right - Switch part | Enter - Done | Esc - Discard".to_string()
        }
        (_, true) => "Type to edit | Backspace - Delete | Enter - Done | Esc - Discard".to_string(),
        (None, false) => {
            "Enter - Edit | Up/Down - Navigate | Del - Clear | S - Save | Esc - Back".to_string()
        }
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let items: Vec<ListItem> = Field::ALL
        .iter()
        .map(|&field| {
            let selected = field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_style = if selected && state.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else if state.is_unchanged(field) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            let mut spans = vec![
                Span::styled(field.label(), label_style),
            ];
            if is_field_required(field) {
                spans.push(Span::styled("*", Style::default().fg(Color::Red)));
            }
            spans.push(Span::styled(": ", label_style));
            spans.push(Span::styled(state.display_value(field), value_style));
            if let Some(error) = state.visible_error(field) {
                spans.push(Span::styled(
                    format!("  {error}"),
                    Style::default().fg(Color::Red),
                ));
            }

            ListItem::new(Spans::from(spans))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(state.current_field as usize));

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"))
        .highlight_symbol("> ");

    f.render_stateful_widget(form_list, area, &mut list_state);
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        state.status = None;
        match key.code {
            KeyCode::Enter if state.editing => state.toggle_editing(),
            KeyCode::Esc if state.editing => state.cancel_editing(),
            _ if state.editing => state.edit_current_field(key.code),
            KeyCode::Esc => return Ok(Some(ProjectWizardAction::Cancel)),
            KeyCode::Enter => state.toggle_editing(),
            KeyCode::Up => state.previous_field(),
            KeyCode::Down | KeyCode::Tab => state.next_field(),
            KeyCode::Delete => state.clear_current_field(),
            KeyCode::Char('s') => return Ok(state.submit()),
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectStatus;
    use crate::validator::REQUIRED_FIELDS;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn type_text(state: &mut ProjectWizardState, text: &str) {
        for c in text.chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
    }

    fn create_state() -> ProjectWizardState {
        ProjectWizardState::with_today(WizardMode::Create, ProjectForm::new(), day("2024-03-10"))
    }

    #[test]
    fn errors_stay_hidden_until_touched() {
        let mut state = create_state();
        assert_eq!(state.visible_error(Field::ProjectName), None);

        state.toggle_editing();
        state.toggle_editing();

        assert_eq!(
            state.visible_error(Field::ProjectName),
            Some("Project Name is required")
        );
        assert_eq!(state.visible_error(Field::Code), None);
    }

    #[test]
    fn typing_fills_the_selected_field() {
        let mut state = create_state();
        state.toggle_editing();
        type_text(&mut state, "Atlas");
        state.edit_current_field(KeyCode::Backspace);
        state.toggle_editing();

        assert_eq!(state.form.get(Field::ProjectName), Some("Atla"));
        assert_eq!(state.visible_error(Field::ProjectName), None);
    }

    #[test]
    fn numeric_fields_drop_letters() {
        let mut state = create_state();
        state.current_field = Field::BudgetActualUsd;
        state.toggle_editing();
        type_text(&mut state, "1a2.5x");
        state.toggle_editing();

        assert_eq!(state.form.get(Field::BudgetActualUsd), Some("12.5"));
    }

    #[test]
    fn milestone_entry_starts_at_previous_slot() {
        let form = ProjectForm::new().with(Field::Milestones0, "2024-05-01");
        let mut state = ProjectWizardState::with_today(WizardMode::Create, form, day("2024-03-10"));
        state.current_field = Field::Milestones1;

        state.toggle_editing();
        // Year before the floor is refused
        type_text(&mut state, "2023");
        type_text(&mut state, "2024");
        state.toggle_editing();

        assert_eq!(state.form.get(Field::Milestones1), Some("2024-05-01"));
    }

    #[test]
    fn opening_and_closing_date_editor_keeps_slot_empty() {
        let mut state = create_state();
        state.current_field = Field::Milestones5;

        state.toggle_editing();
        state.toggle_editing();

        assert_eq!(state.form.get(Field::Milestones5), None);
        assert_eq!(state.form.to_project().status(), ProjectStatus::Ongoing);
    }

    #[test]
    fn refused_date_leaves_slot_empty() {
        let mut state = create_state();
        state.current_field = Field::Milestones5;

        state.toggle_editing();
        type_text(&mut state, "2020");
        state.toggle_editing();

        assert_eq!(state.form.get(Field::Milestones5), None);
    }

    #[test]
    fn cancel_discards_date_edit() {
        let mut state = create_state();
        state.current_field = Field::Milestones5;

        state.toggle_editing();
        type_text(&mut state, "2025");
        state.cancel_editing();

        assert!(!state.editing);
        assert_eq!(state.form.get(Field::Milestones5), None);
    }

    #[test]
    fn cancel_restores_previous_text() {
        let form = ProjectForm::new().with(Field::Risk, "Low");
        let mut state = ProjectWizardState::with_today(WizardMode::Create, form, day("2024-03-10"));
        state.current_field = Field::Risk;

        state.toggle_editing();
        type_text(&mut state, " and rising");
        state.cancel_editing();

        assert_eq!(state.form.get(Field::Risk), Some("Low"));

        state.current_field = Field::Pm;
        state.toggle_editing();
        type_text(&mut state, "Dana");
        state.cancel_editing();
        assert_eq!(state.form.get(Field::Pm), None);
    }

    #[test]
    fn submit_reports_every_missing_field() {
        let mut state = create_state();
        assert!(state.submit().is_none());
        for field in REQUIRED_FIELDS {
            assert!(state.visible_error(field).is_some());
        }
        assert!(state.status.is_some());
    }

    #[test]
    fn valid_form_submits() {
        let form = REQUIRED_FIELDS
            .into_iter()
            .fold(ProjectForm::new(), |form, field| form.with(field, "value"));
        let mut state = ProjectWizardState::with_today(WizardMode::Create, form.clone(), day("2024-03-10"));

        match state.submit() {
            Some(ProjectWizardAction::Submit(submitted)) => assert_eq!(submitted, form),
            _ => panic!("expected submission"),
        }
    }

    #[test]
    fn edit_mode_tracks_unchanged_values() {
        let project = Project {
            project_name: "Atlas".to_string(),
            risk: "Low".to_string(),
            ..Default::default()
        };
        let mut state = ProjectWizardState::from_existing(&project);
        assert_eq!(
            state.mode,
            WizardMode::Edit {
                original_name: "Atlas".to_string()
            }
        );
        assert!(state.is_unchanged(Field::Risk));

        state.current_field = Field::Risk;
        state.toggle_editing();
        type_text(&mut state, "er");
        state.toggle_editing();

        assert!(!state.is_unchanged(Field::Risk));
        assert!(state.is_unchanged(Field::ProjectName));
    }

    #[test]
    fn clearing_sets_blank_value() {
        let form = ProjectForm::new().with(Field::Milestones5, "2024-06-01");
        let mut state = ProjectWizardState::with_today(WizardMode::Create, form, day("2024-03-10"));
        state.current_field = Field::Milestones5;
        state.clear_current_field();
        assert_eq!(state.form.get(Field::Milestones5), Some(""));
    }

    #[test]
    fn store_errors_are_shown_immediately() {
        let mut state = create_state();
        state.set_errors(FieldErrors::from([(
            Field::ProjectName,
            "Project Name already exists".to_string(),
        )]));
        assert_eq!(
            state.visible_error(Field::ProjectName),
            Some("Project Name already exists")
        );
    }
}
