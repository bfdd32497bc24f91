//! Field-level validation of project forms.
//!
//! Validation never short-circuits: every violation in the form is reported
//! so the form can flag all offending inputs at once.

use std::collections::BTreeMap;

use crate::models::{Field, ProjectForm};

/// Field name → single human readable message. Empty means valid.
pub type FieldErrors = BTreeMap<Field, String>;

pub const REQUIRED_FIELDS: [Field; 12] = [
    Field::ProjectName,
    Field::Code,
    Field::Overview,
    Field::ProjectScope,
    Field::ProjectGoals1,
    Field::ProjectGoals2,
    Field::ExecSponsor,
    Field::BusinessProduct,
    Field::ProcessOwner,
    Field::Pm,
    Field::Dev,
    Field::Risk,
];

pub fn is_field_required(field: Field) -> bool {
    REQUIRED_FIELDS.contains(&field)
}

fn required_message(field: Field) -> String {
    let message = match field {
        Field::ProjectName => "Project Name is required",
        Field::Code => "Code is required",
        Field::Overview => "Overview is required",
        Field::ProjectScope => "Project Scope is required",
        Field::ProjectGoals1 => "Project goals 1 is required",
        Field::ProjectGoals2 => "Project goals 2 is required",
        Field::ExecSponsor => "Exec sponsor is required",
        Field::BusinessProduct => "Business Product is required",
        Field::ProcessOwner => "Process owner is required",
        Field::Pm => "Project Manager is required",
        Field::Dev => "Developer is required",
        Field::Risk => "Risk is required",
        _ => return format!("{} is required", field.label()),
    };
    message.to_string()
}

fn amount_label(field: Field) -> &'static str {
    match field {
        Field::BudgetActualUsd => "Budget Actual",
        Field::BudgetPlannedUsd => "Budget Planned",
        _ => field.label(),
    }
}

pub fn validate_project_form(form: &ProjectForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in REQUIRED_FIELDS {
        if form.non_empty(field).is_none() {
            errors.insert(field, required_message(field));
        }
    }

    for field in [Field::BudgetActualUsd, Field::BudgetPlannedUsd] {
        match form.amount(field) {
            Some(Ok(amount)) if amount < 0.0 => {
                errors.insert(
                    field,
                    format!("{} must be a positive number", amount_label(field)),
                );
            }
            Some(Ok(amount)) if !amount.is_finite() => {
                errors.insert(field, format!("{} must be a number", amount_label(field)));
            }
            Some(Err(_)) => {
                errors.insert(field, format!("{} must be a number", amount_label(field)));
            }
            _ => {}
        }
    }

    errors
}
