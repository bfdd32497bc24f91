use chrono::NaiveDate;

use crate::models::{Field, Project, ProjectForm};

pub const MILESTONE_SLOTS: usize = 6;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Slot-aligned milestone dates of one project.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    /// Always one entry per slot; absent slots are empty strings.
    pub entries: [String; MILESTONE_SLOTS],
    pub is_finished: bool,
}

impl Timeline {
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Field::MILESTONES
            .iter()
            .zip(self.entries.iter())
            .map(|(field, date)| (field.label(), date.as_str()))
    }
}

pub fn derive_timeline(project: &Project) -> Timeline {
    let entries = std::array::from_fn(|slot| project.milestone(slot).unwrap_or_default().to_string());
    Timeline {
        entries,
        is_finished: project.is_finished(),
    }
}

/// Timeline for an optional project; no project yields six empty slots.
pub fn timeline_for(project: Option<&Project>) -> Timeline {
    project.map(derive_timeline).unwrap_or_default()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Earliest date a form may offer for milestone `slot`.
///
/// Slot 0 is floored at `today`; later slots at the previous slot's value
/// when it holds a date, else `today`.
pub fn min_selectable_date(form: &ProjectForm, slot: usize, today: NaiveDate) -> NaiveDate {
    if slot == 0 {
        return today;
    }
    Field::milestone(slot - 1)
        .and_then(|previous| form.non_empty(previous))
        .and_then(parse_date)
        .unwrap_or(today)
}
