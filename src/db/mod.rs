use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::config::Config;
use crate::error::RepositoryError;
use crate::models::{Project, ProjectForm};

#[cfg(test)]
pub mod memory;

/// Durable home of the project collection.
///
/// Projects are addressed by `project_name`; a name that does not exist
/// yields [`RepositoryError::NotFound`].
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Project>, RepositoryError>;

    async fn get_by_name(&self, name: &str) -> Result<Project, RepositoryError>;

    async fn create(&self, project: &Project) -> Result<Project, RepositoryError>;

    /// Apply the fields present in `patch` to the project called `name`.
    async fn update(&self, name: &str, patch: &ProjectForm) -> Result<Project, RepositoryError>;

    async fn delete(&self, name: &str) -> Result<(), RepositoryError>;
}

const PROJECT_COLUMNS: &str = "project_name, code, overview, project_scope, \
    project_goals_1, project_goals_2, exec_sponsor, business_product, process_owner, \
    pm, dev, risk, budget_actual_usd, budget_planned_usd, \
    milestones0, milestones1, milestones2, milestones3, milestones4, milestones5";

/// Bind all project columns in `PROJECT_COLUMNS` order as `$1..$20`.
fn bind_project<'q>(
    query: QueryAs<'q, Postgres, Project, PgArguments>,
    project: &'q Project,
) -> QueryAs<'q, Postgres, Project, PgArguments> {
    query
        .bind(&project.project_name)
        .bind(&project.code)
        .bind(&project.overview)
        .bind(&project.project_scope)
        .bind(&project.project_goals_1)
        .bind(&project.project_goals_2)
        .bind(&project.exec_sponsor)
        .bind(&project.business_product)
        .bind(&project.process_owner)
        .bind(&project.pm)
        .bind(&project.dev)
        .bind(&project.risk)
        .bind(project.budget_actual_usd)
        .bind(project.budget_planned_usd)
        .bind(&project.milestones0)
        .bind(&project.milestones1)
        .bind(&project.milestones2)
        .bind(&project.milestones3)
        .bind(&project.milestones4)
        .bind(&project.milestones5)
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectRepository for Database {
    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id ASC"
        ))
        .fetch_all(self.get_pool())
        .await?;

        Ok(projects)
    }

    async fn get_by_name(&self, name: &str) -> Result<Project, RepositoryError> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE project_name = $1"
        ))
        .bind(name)
        .fetch_optional(self.get_pool())
        .await?
        .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }

    async fn create(&self, project: &Project) -> Result<Project, RepositoryError> {
        let sql = format!(
            "INSERT INTO projects ({PROJECT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING {PROJECT_COLUMNS}"
        );
        let created = bind_project(sqlx::query_as::<_, Project>(&sql), project)
            .fetch_one(self.get_pool())
            .await?;

        Ok(created)
    }

    async fn update(&self, name: &str, patch: &ProjectForm) -> Result<Project, RepositoryError> {
        // Read, patch and write back under a row lock
        let mut tx = self.pool.begin().await?;

        let mut project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE project_name = $1 FOR UPDATE"
        ))
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;

        patch.apply_to(&mut project);

        let sql = format!(
            "UPDATE projects SET \
                project_name = $1, code = $2, overview = $3, project_scope = $4, \
                project_goals_1 = $5, project_goals_2 = $6, exec_sponsor = $7, \
                business_product = $8, process_owner = $9, pm = $10, dev = $11, risk = $12, \
                budget_actual_usd = $13, budget_planned_usd = $14, \
                milestones0 = $15, milestones1 = $16, milestones2 = $17, \
                milestones3 = $18, milestones4 = $19, milestones5 = $20 \
             WHERE project_name = $21 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let updated = bind_project(sqlx::query_as::<_, Project>(&sql), &project)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE project_name = $1")
            .bind(name)
            .execute(self.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(name.to_string()));
        }

        Ok(())
    }
}

/// Initialize the database connection pool and bring the schema up to date
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    sqlx::migrate!("./migrations").run(db.get_pool()).await?;

    Ok(db)
}
