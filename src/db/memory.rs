use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::ProjectRepository;
use crate::error::RepositoryError;
use crate::models::{Project, ProjectForm};

/// In-process repository with failure injection for exercising the store.
#[derive(Default)]
pub struct MemoryRepository {
    projects: Mutex<Vec<Project>>,
    fail_list: Mutex<bool>,
    fail_names: Mutex<HashSet<String>>,
}

impl MemoryRepository {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
            ..Default::default()
        }
    }

    pub fn fail_list(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    /// Make every mutation addressed to `name` fail.
    pub fn fail_on(&self, name: &str) {
        self.fail_names.lock().unwrap().insert(name.to_string());
    }

    pub fn names(&self) -> Vec<String> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.project_name.clone())
            .collect()
    }

    fn check(&self, name: &str) -> Result<(), RepositoryError> {
        if self.fail_names.lock().unwrap().contains(name) {
            return Err(RepositoryError::Unavailable(format!("injected failure for {name}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        if *self.fail_list.lock().unwrap() {
            return Err(RepositoryError::Unavailable("list failed".to_string()));
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn get_by_name(&self, name: &str) -> Result<Project, RepositoryError> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.project_name == name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }

    async fn create(&self, project: &Project) -> Result<Project, RepositoryError> {
        self.check(&project.project_name)?;
        self.projects.lock().unwrap().push(project.clone());
        Ok(project.clone())
    }

    async fn update(&self, name: &str, patch: &ProjectForm) -> Result<Project, RepositoryError> {
        self.check(name)?;
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.project_name == name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        patch.apply_to(project);
        Ok(project.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        self.check(name)?;
        // Yield so concurrent deletes genuinely interleave
        tokio::task::yield_now().await;
        let mut projects = self.projects.lock().unwrap();
        let before = projects.len();
        projects.retain(|p| p.project_name != name);
        if projects.len() == before {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
