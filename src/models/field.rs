/// One editable attribute of a [`Project`](super::Project), in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ProjectName,
    Code,
    Overview,
    ProjectScope,
    ProjectGoals1,
    ProjectGoals2,
    ExecSponsor,
    BusinessProduct,
    ProcessOwner,
    Pm,
    Dev,
    Risk,
    BudgetActualUsd,
    BudgetPlannedUsd,
    Milestones0,
    Milestones1,
    Milestones2,
    Milestones3,
    Milestones4,
    Milestones5,
}

impl Field {
    pub const ALL: [Field; 20] = [
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
        Field::BudgetActualUsd,
        Field::BudgetPlannedUsd,
        Field::Milestones0,
        Field::Milestones1,
        Field::Milestones2,
        Field::Milestones3,
        Field::Milestones4,
        Field::Milestones5,
    ];

    pub const MILESTONES: [Field; 6] = [
        Field::Milestones0,
        Field::Milestones1,
        Field::Milestones2,
        Field::Milestones3,
        Field::Milestones4,
        Field::Milestones5,
    ];

    /// Column / wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Field::ProjectName => "project_name",
            Field::Code => "code",
            Field::Overview => "overview",
            Field::ProjectScope => "project_scope",
            Field::ProjectGoals1 => "project_goals_1",
            Field::ProjectGoals2 => "project_goals_2",
            Field::ExecSponsor => "exec_sponsor",
            Field::BusinessProduct => "business_product",
            Field::ProcessOwner => "process_owner",
            Field::Pm => "pm",
            Field::Dev => "dev",
            Field::Risk => "risk",
            Field::BudgetActualUsd => "budget_actual_usd",
            Field::BudgetPlannedUsd => "budget_planned_usd",
            Field::Milestones0 => "milestones0",
            Field::Milestones1 => "milestones1",
            Field::Milestones2 => "milestones2",
            Field::Milestones3 => "milestones3",
            Field::Milestones4 => "milestones4",
            Field::Milestones5 => "milestones5",
        }
    }

    /// Human readable label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::ProjectName => "Project Name",
            Field::Code => "Code",
            Field::Overview => "Overview",
            Field::ProjectScope => "Project Scope",
            Field::ProjectGoals1 => "Project Goals 1",
            Field::ProjectGoals2 => "Project Goals 2",
            Field::ExecSponsor => "Executive Sponsor",
            Field::BusinessProduct => "Business Product",
            Field::ProcessOwner => "Process Owner",
            Field::Pm => "Project Manager",
            Field::Dev => "Developer",
            Field::Risk => "Risk",
            Field::BudgetActualUsd => "Budget Actual (USD)",
            Field::BudgetPlannedUsd => "Budget Planned (USD)",
            Field::Milestones0 => "Project start date",
            Field::Milestones1 => "Milestone 1",
            Field::Milestones2 => "Milestone 2",
            Field::Milestones3 => "Milestone 3",
            Field::Milestones4 => "Milestone 4",
            Field::Milestones5 => "Project end date",
        }
    }

    /// Slot index `0..6` for milestone fields.
    pub fn milestone_slot(self) -> Option<usize> {
        Field::MILESTONES.iter().position(|field| *field == self)
    }

    pub fn milestone(slot: usize) -> Option<Field> {
        Field::MILESTONES.get(slot).copied()
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Field::BudgetActualUsd | Field::BudgetPlannedUsd)
    }

    pub fn next(self) -> Field {
        let i = self as usize;
        Field::ALL[(i + 1) % Field::ALL.len()]
    }

    pub fn previous(self) -> Field {
        let i = self as usize;
        Field::ALL[(i + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let names: std::collections::HashSet<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Field::ALL.len());
    }

    #[test]
    fn milestone_slots_follow_declaration_order() {
        assert_eq!(Field::Milestones0.milestone_slot(), Some(0));
        assert_eq!(Field::Milestones5.milestone_slot(), Some(5));
        assert_eq!(Field::Risk.milestone_slot(), None);
        assert_eq!(Field::milestone(3), Some(Field::Milestones3));
        assert_eq!(Field::milestone(6), None);
    }

    #[test]
    fn navigation_wraps_around() {
        assert_eq!(Field::Milestones5.next(), Field::ProjectName);
        assert_eq!(Field::ProjectName.previous(), Field::Milestones5);
        assert_eq!(Field::Code.next(), Field::Overview);
    }
}
