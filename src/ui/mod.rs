pub mod components;
pub mod dashboard;
pub mod delete_select;
pub mod project_picker;
pub mod project_wizard;
