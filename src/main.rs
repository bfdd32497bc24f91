mod config;
mod db;
mod error;
mod logging;
mod milestones;
mod models;
mod pagination;
mod report;
mod store;
mod ui;
mod validator;

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use tracing::info;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::db::{Database, ProjectRepository};
use crate::error::StoreError;
use crate::report::{export_report, ReportGenerator};
use crate::store::ProjectStore;
use crate::ui::{
    dashboard::{DashboardState, DashboardAction, render_dashboard, handle_input as handle_dashboard_input},
    delete_select::{DeleteSelectState, DeleteSelectAction, render_delete_select, handle_input as handle_delete_select_input},
    project_picker::{ProjectPickerState, ProjectPickerAction, render_project_picker, handle_input as handle_project_picker_input},
    project_wizard::{ProjectWizardState, ProjectWizardAction, WizardMode, render_project_wizard, handle_input as handle_project_wizard_input},
};

#[derive(Parser)]
#[command(name = "project-tracker", version, about = "Track projects, milestones and budgets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print every project with its status and budget indicator
    List,
    /// Refresh the collection and export the printable report
    Report {
        /// Directory to write the report to, overriding REPORT_DIR
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

// Represents the current screen in the app
enum AppScreen {
    Dashboard,
    ProjectWizard,
    ProjectPicker,
    DeleteSelect,
}

// Main application state
struct AppState {
    store: ProjectStore<Database>,
    reports: ReportGenerator,
    screen: AppScreen,
    dashboard_state: DashboardState,
    project_wizard_state: Option<ProjectWizardState>,
    project_picker_state: Option<ProjectPickerState>,
    delete_select_state: Option<DeleteSelectState>,
}

impl AppState {
    fn new(store: ProjectStore<Database>, reports: ReportGenerator) -> Self {
        let dashboard_state = DashboardState::new(store.subscribe());
        Self {
            store,
            reports,
            screen: AppScreen::Dashboard,
            dashboard_state,
            project_wizard_state: None,
            project_picker_state: None,
            delete_select_state: None,
        }
    }

    fn show_dashboard(&mut self, status: Option<String>) {
        self.project_wizard_state = None;
        self.project_picker_state = None;
        self.delete_select_state = None;
        self.dashboard_state.status = status;
        self.screen = AppScreen::Dashboard;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    logging::init(&config)?;
    info!("starting project tracker");

    // Initialize database connection
    let db = db::init(&config).await?;
    let mut store = ProjectStore::new(db);

    match cli.command {
        Some(Command::List) => return list_projects(&mut store).await,
        Some(Command::Report { output_dir }) => {
            let dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.report_dir));
            let reports = ReportGenerator::new(dir)?;
            let files = export_report(&mut store, &reports).await?;
            println!("Markdown written to {}", files.markdown.display());
            println!("Report written to {}", files.pdf.display());
            return Ok(());
        }
        None => {}
    }

    let reports = ReportGenerator::new(&config.report_dir)?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(store, reports);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        println!("Error: {}", err);
    }

    info!("project tracker stopped");
    Ok(())
}

async fn list_projects(store: &mut ProjectStore<Database>) -> Result<()> {
    store.fetch_all().await;
    if let Some(error) = store.error() {
        bail!("failed to fetch projects: {error}");
    }

    for project in store.projects() {
        println!(
            "{}\t{}\t{}\t{}",
            project.project_name,
            project.code,
            project.status(),
            project.budget_status()
        );
    }
    Ok(())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    terminal.draw(|f| match app_state.screen {
        AppScreen::Dashboard => render_dashboard(f, &mut app_state.dashboard_state),
        AppScreen::ProjectWizard => {
            if let Some(state) = &mut app_state.project_wizard_state {
                render_project_wizard(f, state);
            }
        }
        AppScreen::ProjectPicker => {
            if let Some(state) = &mut app_state.project_picker_state {
                render_project_picker(f, state);
            }
        }
        AppScreen::DeleteSelect => {
            if let Some(state) = &mut app_state.delete_select_state {
                render_delete_select(f, state);
            }
        }
    })?;
    Ok(())
}

/// Fetch with the loading indicator visible while the request is in flight.
async fn refresh<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    app_state.store.begin_fetch();
    draw(terminal, app_state)?;
    let result = app_state.store.repository().list().await;
    app_state.store.apply_fetch(result);
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    refresh(terminal, app_state).await?;

    loop {
        draw(terminal, app_state)?;

        let should_quit = match app_state.screen {
            AppScreen::Dashboard => handle_dashboard_screen(terminal, app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
            AppScreen::ProjectPicker => handle_project_picker_screen(app_state).await?,
            AppScreen::DeleteSelect => handle_delete_select_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_dashboard_screen<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
) -> Result<bool> {
    let Some(action) = handle_dashboard_input(&mut app_state.dashboard_state)? else {
        return Ok(false);
    };

    match action {
        DashboardAction::Quit => return Ok(true),
        DashboardAction::PreviousPage => {
            if app_state.store.previous_page().is_err() {
                app_state.dashboard_state.status = Some("Already on the first project".to_string());
            }
        }
        DashboardAction::NextPage => {
            if app_state.store.next_page().is_err() {
                app_state.dashboard_state.status = Some("Already on the last project".to_string());
            }
        }
        DashboardAction::FirstPage => {
            app_state.store.go_to_page(1).ok();
        }
        DashboardAction::LastPage => {
            let last = app_state.store.pagination().total_pages();
            app_state.store.go_to_page(last).ok();
        }
        DashboardAction::NewProject => {
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard;
        }
        DashboardAction::EditProject => {
            let snapshot = app_state.store.snapshot();
            let current = snapshot.current_project().map(|p| p.project_name.as_str());
            app_state.project_picker_state =
                Some(ProjectPickerState::new(snapshot.project_names(), current));
            app_state.screen = AppScreen::ProjectPicker;
        }
        DashboardAction::DeleteProjects => {
            let names = app_state.store.snapshot().project_names();
            app_state.delete_select_state = Some(DeleteSelectState::new(names));
            app_state.screen = AppScreen::DeleteSelect;
        }
        DashboardAction::DeleteCurrent(name) => {
            let status = match app_state.store.delete(&name).await {
                Ok(()) => format!("Project {name} deleted"),
                Err(err) => format!("Error deleting project: {err}"),
            };
            app_state.dashboard_state.status = Some(status);
        }
        DashboardAction::PrintReport => {
            let status = match export_report(&mut app_state.store, &app_state.reports).await {
                Ok(files) => format!("Report written to {}", files.pdf.display()),
                Err(err) => format!("Error printing report: {err}"),
            };
            app_state.dashboard_state.status = Some(status);
        }
        DashboardAction::Refresh => refresh(terminal, app_state).await?,
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.project_wizard_state {
        match handle_project_wizard_input(state)? {
            Some(ProjectWizardAction::Cancel) => {
                app_state.show_dashboard(None);
            }
            Some(ProjectWizardAction::Submit(form)) => {
                let result = match &state.mode {
                    WizardMode::Create => app_state.store.create(&form).await,
                    WizardMode::Edit { original_name } => {
                        app_state.store.update(original_name, &form).await
                    }
                };

                match result {
                    Ok(project) => {
                        app_state.show_dashboard(Some(format!(
                            "Project {} saved",
                            project.project_name
                        )));
                    }
                    Err(StoreError::Validation(errors)) => state.set_errors(errors),
                    Err(err) => state.status = Some(format!("Error saving project: {err}")),
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_project_picker_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.project_picker_state {
        match handle_project_picker_input(state)? {
            Some(ProjectPickerAction::Back) => {
                app_state.show_dashboard(None);
            }
            Some(ProjectPickerAction::Pick(name)) => {
                match app_state.store.get_by_name(&name).await {
                    Ok(project) => {
                        app_state.project_picker_state = None;
                        app_state.project_wizard_state =
                            Some(ProjectWizardState::from_existing(&project));
                        app_state.screen = AppScreen::ProjectWizard;
                    }
                    Err(err) => {
                        state.status = Some(format!("Error fetching project details: {err}"));
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_delete_select_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.delete_select_state {
        match handle_delete_select_input(state)? {
            Some(DeleteSelectAction::Back) => {
                app_state.show_dashboard(None);
            }
            Some(DeleteSelectAction::Delete(names)) => {
                let report = app_state.store.delete_many(&names).await;
                state.apply_report(&report);
            }
            None => {}
        }
    }

    Ok(false)
}
