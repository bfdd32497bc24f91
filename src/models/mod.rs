mod field;
mod form;
mod project;

pub use field::Field;
pub use form::ProjectForm;
pub use project::{BudgetStatus, Project, ProjectStatus};
