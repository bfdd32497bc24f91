//! Owned state container for the fetched project collection.
//!
//! Every successful create, update or delete invalidates the snapshot and
//! re-fetches the whole collection from the repository. Overlapping fetches
//! are not sequenced: whichever response is applied last replaces the state.

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::db::ProjectRepository;
use crate::error::{PageError, RepositoryError, StoreError};
use crate::milestones::{Timeline, timeline_for};
use crate::models::{Field, Project, ProjectForm};
use crate::pagination::Pagination;
use crate::validator::validate_project_form;

/// What views observe: the collection, fetch status and the page cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub error: Option<String>,
    pub pagination: Pagination,
}

impl StoreSnapshot {
    pub fn current_project(&self) -> Option<&Project> {
        self.pagination.current_project(&self.projects)
    }

    pub fn timeline(&self) -> Timeline {
        timeline_for(self.current_project())
    }

    pub fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.project_name.clone()).collect()
    }
}

/// Outcome of deleting several projects at once.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, RepositoryError)>,
}

impl BulkDeleteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|(name, _)| name.as_str()).collect()
    }
}

pub struct ProjectStore<R> {
    repo: R,
    state: StoreSnapshot,
    in_flight: usize,
    tx: watch::Sender<StoreSnapshot>,
}

impl<R: ProjectRepository> ProjectStore<R> {
    pub fn new(repo: R) -> Self {
        let (tx, _) = watch::channel(StoreSnapshot::default());
        Self {
            repo,
            state: StoreSnapshot::default(),
            in_flight: 0,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.state
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    #[cfg(test)]
    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.pagination
    }

    #[cfg(test)]
    pub fn current_project(&self) -> Option<&Project> {
        self.state.current_project()
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }

    /// Mark a fetch as in flight. Existing data is kept.
    pub fn begin_fetch(&mut self) {
        self.in_flight += 1;
        self.state.loading = true;
        self.publish();
    }

    /// Apply the outcome of a fetch started with [`begin_fetch`](Self::begin_fetch).
    ///
    /// A failure records the error and keeps the last known good collection.
    pub fn apply_fetch(&mut self, result: Result<Vec<Project>, RepositoryError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.state.loading = self.in_flight > 0;

        match result {
            Ok(projects) => {
                debug!(count = projects.len(), "projects fetched");
                self.state.projects = projects;
                self.state.error = None;
                self.state.pagination.sync(self.state.projects.len());
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch projects");
                self.state.error = Some(err.to_string());
            }
        }

        self.publish();
    }

    pub async fn fetch_all(&mut self) {
        self.begin_fetch();
        let result = self.repo.list().await;
        self.apply_fetch(result);
    }

    /// Drop the cached collection in favour of the repository's current state.
    async fn invalidate(&mut self) {
        debug!("project collection invalidated");
        self.fetch_all().await;
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Project, StoreError> {
        Ok(self.repo.get_by_name(name).await?)
    }

    fn name_taken(&self, name: &str, except: Option<&str>) -> bool {
        Some(name) != except && self.state.projects.iter().any(|p| p.project_name == name)
    }

    fn check_form(&self, form: &ProjectForm, renaming: Option<&str>) -> Result<(), StoreError> {
        let mut errors = validate_project_form(form);

        if let Some(name) = form.non_empty(Field::ProjectName) {
            if self.name_taken(name, renaming) {
                errors.insert(
                    Field::ProjectName,
                    "Project Name already exists".to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(fields = errors.len(), "form rejected");
            Err(StoreError::Validation(errors))
        }
    }

    pub async fn create(&mut self, form: &ProjectForm) -> Result<Project, StoreError> {
        self.check_form(form, None)?;

        let project = form.to_project();
        let created = self.repo.create(&project).await.inspect_err(|err| {
            warn!(project = %project.project_name, error = %err, "failed to create project");
        })?;
        info!(project = %created.project_name, "project created");

        self.invalidate().await;
        Ok(created)
    }

    /// Validate `patch` and apply it to the project currently named `name`.
    pub async fn update(&mut self, name: &str, patch: &ProjectForm) -> Result<Project, StoreError> {
        self.check_form(patch, Some(name))?;

        let updated = self.repo.update(name, patch).await.inspect_err(|err| {
            warn!(project = %name, error = %err, "failed to update project");
        })?;
        info!(project = %name, renamed_to = %updated.project_name, "project updated");

        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.repo.delete(name).await.inspect_err(|err| {
            warn!(project = %name, error = %err, "failed to delete project");
        })?;
        info!(project = %name, "project deleted");

        self.invalidate().await;
        Ok(())
    }

    /// Delete every name concurrently and report which ones failed.
    pub async fn delete_many(&mut self, names: &[String]) -> BulkDeleteReport {
        let repo = &self.repo;
        let results = join_all(names.iter().map(|name| async move {
            let result = repo.delete(name).await;
            (name.clone(), result)
        }))
        .await;

        let mut report = BulkDeleteReport::default();
        for (name, result) in results {
            match result {
                Ok(()) => report.deleted.push(name),
                Err(err) => {
                    warn!(project = %name, error = %err, "failed to delete project");
                    report.failed.push((name, err));
                }
            }
        }
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "bulk delete finished"
        );

        if !report.deleted.is_empty() {
            self.invalidate().await;
        }
        report
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), PageError> {
        self.state.pagination.go_to_page(page)?;
        self.publish();
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), PageError> {
        self.state.pagination.next_page()?;
        self.publish();
        Ok(())
    }

    pub fn previous_page(&mut self) -> Result<(), PageError> {
        self.state.pagination.previous_page()?;
        self.publish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::validator::REQUIRED_FIELDS;
    use pretty_assertions::assert_eq;

    fn form(name: &str) -> ProjectForm {
        REQUIRED_FIELDS
            .into_iter()
            .fold(ProjectForm::new(), |form, field| form.with(field, "value"))
            .with(Field::ProjectName, name)
    }

    fn project(name: &str) -> Project {
        form(name).to_project()
    }

    fn seeded(names: &[&str]) -> ProjectStore<MemoryRepository> {
        ProjectStore::new(MemoryRepository::with_projects(
            names.iter().map(|n| project(n)).collect(),
        ))
    }

    fn current_name<R: ProjectRepository>(store: &ProjectStore<R>) -> Option<String> {
        store.current_project().map(|p| p.project_name.clone())
    }

    #[tokio::test]
    async fn fetch_populates_collection_and_pages() {
        let mut store = seeded(&["alpha", "beta", "gamma"]);
        store.fetch_all().await;

        assert!(!store.loading());
        assert_eq!(store.error(), None);
        assert_eq!(store.pagination().total_pages(), 3);
        assert_eq!(current_name(&store).as_deref(), Some("alpha"));

        store.go_to_page(2).unwrap();
        assert_eq!(current_name(&store).as_deref(), Some("beta"));
        assert!(store.go_to_page(4).is_err());
        assert_eq!(current_name(&store).as_deref(), Some("beta"));
    }

    #[tokio::test]
    async fn empty_collection_has_no_current_project() {
        let mut store = seeded(&[]);
        store.fetch_all().await;

        assert_eq!(store.current_project(), None);
        assert_eq!(store.snapshot().timeline(), Timeline::default());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_last_known_good_data() {
        let mut store = seeded(&["alpha", "beta"]);
        store.fetch_all().await;

        store.repository().fail_list(true);
        store.fetch_all().await;

        assert_eq!(store.projects().len(), 2);
        assert!(store.error().is_some());
        assert!(!store.loading());

        store.repository().fail_list(false);
        store.fetch_all().await;
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn last_applied_fetch_wins_and_loading_tracks_in_flight() {
        let mut store = seeded(&["alpha"]);

        store.begin_fetch();
        store.begin_fetch();
        assert!(store.loading());

        let newer = vec![project("alpha"), project("beta")];
        let older = vec![project("alpha")];

        store.apply_fetch(Ok(newer));
        assert!(store.loading());

        store.apply_fetch(Ok(older));
        assert!(!store.loading());
        assert_eq!(store.snapshot().project_names(), vec!["alpha".to_string()]);
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_repository() {
        let mut store = seeded(&[]);
        store.fetch_all().await;

        let mut invalid = form("delta").with(Field::BudgetActualUsd, "-5");
        invalid.remove(Field::Pm);

        let err = store.create(&invalid).await.unwrap_err();
        let StoreError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![Field::Pm, Field::BudgetActualUsd]
        );
        assert!(store.repository().names().is_empty());
    }

    #[tokio::test]
    async fn create_refetches_collection() {
        let mut store = seeded(&["alpha"]);
        store.fetch_all().await;

        let created = store.create(&form("beta")).await.unwrap();

        assert_eq!(created.project_name, "beta");
        assert_eq!(
            store.snapshot().project_names(),
            vec!["alpha".to_string(), "beta".to_string()]
        );
        assert_eq!(store.pagination().total_pages(), 2);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_on_create() {
        let mut store = seeded(&["alpha"]);
        store.fetch_all().await;

        let err = store.create(&form("alpha")).await.unwrap_err();
        let StoreError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            errors.get(&Field::ProjectName).map(String::as_str),
            Some("Project Name already exists")
        );
    }

    #[tokio::test]
    async fn repository_failure_on_create_is_reported_without_refetch() {
        let mut store = seeded(&["alpha"]);
        store.fetch_all().await;
        store.repository().fail_on("beta");

        let err = store.create(&form("beta")).await.unwrap_err();

        assert!(matches!(err, StoreError::Repository(RepositoryError::Unavailable(_))));
        assert_eq!(store.snapshot().project_names(), vec!["alpha".to_string()]);
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn update_applies_patch_by_name() {
        let mut store = seeded(&["alpha", "beta"]);
        store.fetch_all().await;

        let patch = form("alpha-2").with(Field::Risk, "Vendor delay");
        let updated = store.update("alpha", &patch).await.unwrap();

        assert_eq!(updated.project_name, "alpha-2");
        assert_eq!(updated.risk, "Vendor delay");
        assert_eq!(
            store.snapshot().project_names(),
            vec!["alpha-2".to_string(), "beta".to_string()]
        );
    }

    #[tokio::test]
    async fn update_keeping_own_name_is_not_a_duplicate() {
        let mut store = seeded(&["alpha"]);
        store.fetch_all().await;

        assert!(store.update("alpha", &form("alpha")).await.is_ok());
    }

    #[tokio::test]
    async fn update_of_vanished_project_is_a_repository_error() {
        let mut store = seeded(&["alpha"]);
        store.fetch_all().await;

        let err = store.update("ghost", &form("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::Repository(RepositoryError::NotFound(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn deleted_project_is_absent_after_refetch() {
        let mut store = seeded(&["alpha", "beta", "gamma"]);
        store.fetch_all().await;
        store.go_to_page(3).unwrap();

        store.delete("gamma").await.unwrap();

        assert!(!store.repository().names().contains(&"gamma".to_string()));
        assert_eq!(
            store.snapshot().project_names(),
            vec!["alpha".to_string(), "beta".to_string()]
        );
        assert_eq!(store.pagination().current_page(), 2);
        assert_eq!(current_name(&store).as_deref(), Some("beta"));
    }

    #[tokio::test]
    async fn bulk_delete_removes_every_name() {
        let mut store = seeded(&["alpha", "beta", "gamma"]);
        store.fetch_all().await;

        let report = store
            .delete_many(&["alpha".to_string(), "gamma".to_string()])
            .await;

        assert!(report.is_success());
        assert_eq!(report.deleted.len(), 2);
        store.fetch_all().await;
        assert_eq!(store.snapshot().project_names(), vec!["beta".to_string()]);
    }

    #[tokio::test]
    async fn bulk_delete_reports_partial_failure() {
        let mut store = seeded(&["alpha", "beta", "gamma"]);
        store.fetch_all().await;
        store.repository().fail_on("beta");

        let report = store
            .delete_many(&["alpha".to_string(), "beta".to_string(), "zeta".to_string()])
            .await;

        assert_eq!(report.deleted, vec!["alpha".to_string()]);
        assert_eq!(report.failed_names(), vec!["beta", "zeta"]);
        assert_eq!(
            store.snapshot().project_names(),
            vec!["beta".to_string(), "gamma".to_string()]
        );
    }

    #[tokio::test]
    async fn subscribers_observe_page_changes() {
        let mut store = seeded(&["alpha", "beta"]);
        let mut rx = store.subscribe();
        store.fetch_all().await;
        rx.borrow_and_update();

        store.go_to_page(2).unwrap();

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(
            snapshot.current_project().map(|p| p.project_name.as_str()),
            Some("beta")
        );
    }

    #[tokio::test]
    async fn stepping_past_either_end_is_refused() {
        let mut store = seeded(&["alpha", "beta"]);
        store.fetch_all().await;

        assert_eq!(
            store.previous_page(),
            Err(PageError::OutOfRange { requested: 0, total: 2 })
        );
        store.next_page().unwrap();
        assert_eq!(current_name(&store).as_deref(), Some("beta"));
        assert_eq!(
            store.next_page(),
            Err(PageError::OutOfRange { requested: 3, total: 2 })
        );
        store.previous_page().unwrap();
        assert_eq!(current_name(&store).as_deref(), Some("alpha"));
    }
}
