use std::collections::BTreeMap;

use super::{Field, Project};

/// Candidate field values as entered in a create or edit form.
///
/// Only fields the user supplied are present. The same map doubles as the
/// patch for an update: fields missing from the map are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    values: BTreeMap<Field, String>,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill a form with every non-empty value of an existing project.
    pub fn from_project(project: &Project) -> Self {
        let mut form = Self::new();
        for field in Field::ALL {
            if let Some(value) = read_field(project, field) {
                form.values.insert(field, value);
            }
        }
        form
    }

    #[cfg(test)]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Value of the field if present and non-empty.
    pub fn non_empty(&self, field: Field) -> Option<&str> {
        self.get(field).filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        self.values.entry(field).or_default().push(c);
    }

    pub fn pop_char(&mut self, field: Field) {
        if let Some(value) = self.values.get_mut(&field) {
            value.pop();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Parsed amount of a numeric field; `None` when absent or blank.
    pub fn amount(&self, field: Field) -> Option<Result<f64, std::num::ParseFloatError>> {
        self.get(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::parse::<f64>)
    }

    /// Write every present field onto `project`.
    ///
    /// Blank budgets and milestones clear the stored value. Unparseable
    /// amounts are skipped; callers validate first.
    pub fn apply_to(&self, project: &mut Project) {
        for (field, value) in self.iter() {
            if let Some(slot) = field.milestone_slot() {
                if let Some(target) = project.milestone_mut(slot) {
                    *target = Some(value.to_string()).filter(|v| !v.is_empty());
                }
                continue;
            }

            if field.is_numeric() {
                let amount = match self.amount(field) {
                    Some(Ok(amount)) => Some(amount),
                    Some(Err(_)) => continue,
                    None => None,
                };
                match field {
                    Field::BudgetActualUsd => project.budget_actual_usd = amount,
                    _ => project.budget_planned_usd = amount,
                }
                continue;
            }

            if let Some(target) = text_field_mut(project, field) {
                *target = value.to_string();
            }
        }
    }

    pub fn to_project(&self) -> Project {
        let mut project = Project::default();
        self.apply_to(&mut project);
        project
    }
}

fn read_field(project: &Project, field: Field) -> Option<String> {
    if let Some(slot) = field.milestone_slot() {
        return project.milestone(slot).map(str::to_string);
    }
    match field {
        Field::BudgetActualUsd => project.budget_actual_usd.map(|v| v.to_string()),
        Field::BudgetPlannedUsd => project.budget_planned_usd.map(|v| v.to_string()),
        _ => text_field(project, field)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    }
}

fn text_field(project: &Project, field: Field) -> Option<&str> {
    let value = match field {
        Field::ProjectName => &project.project_name,
        Field::Code => &project.code,
        Field::Overview => &project.overview,
        Field::ProjectScope => &project.project_scope,
        Field::ProjectGoals1 => &project.project_goals_1,
        Field::ProjectGoals2 => &project.project_goals_2,
        Field::ExecSponsor => &project.exec_sponsor,
        Field::BusinessProduct => &project.business_product,
        Field::ProcessOwner => &project.process_owner,
        Field::Pm => &project.pm,
        Field::Dev => &project.dev,
        Field::Risk => &project.risk,
        _ => return None,
    };
    Some(value)
}

fn text_field_mut(project: &mut Project, field: Field) -> Option<&mut String> {
    let value = match field {
        Field::ProjectName => &mut project.project_name,
        Field::Code => &mut project.code,
        Field::Overview => &mut project.overview,
        Field::ProjectScope => &mut project.project_scope,
        Field::ProjectGoals1 => &mut project.project_goals_1,
        Field::ProjectGoals2 => &mut project.project_goals_2,
        Field::ExecSponsor => &mut project.exec_sponsor,
        Field::BusinessProduct => &mut project.business_product,
        Field::ProcessOwner => &mut project.process_owner,
        Field::Pm => &mut project.pm,
        Field::Dev => &mut project.dev,
        Field::Risk => &mut project.risk,
        _ => return None,
    };
    Some(value)
}
