use std::fmt;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Default)]
pub struct Project {
    pub project_name: String,
    pub code: String,
    pub overview: String,
    pub project_scope: String,
    pub project_goals_1: String,
    pub project_goals_2: String,
    pub exec_sponsor: String,
    pub business_product: String,
    pub process_owner: String,
    pub pm: String,
    pub dev: String,
    pub risk: String,
    pub budget_actual_usd: Option<f64>,
    pub budget_planned_usd: Option<f64>,
    pub milestones0: Option<String>,
    pub milestones1: Option<String>,
    pub milestones2: Option<String>,
    pub milestones3: Option<String>,
    pub milestones4: Option<String>,
    pub milestones5: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Ongoing,
    Finished,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Ongoing => f.write_str("ONGOING"),
            ProjectStatus::Finished => f.write_str("FINISHED"),
        }
    }
}

/// Comparison of the actual spend against the planned budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OverBudget,
    WithinBudget,
    Unknown,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetStatus::OverBudget => f.write_str("over budget"),
            BudgetStatus::WithinBudget => f.write_str("within budget"),
            BudgetStatus::Unknown => f.write_str("no budget"),
        }
    }
}

impl Project {
    /// Raw value of milestone slot `0..6`, `None` when absent or empty.
    pub fn milestone(&self, slot: usize) -> Option<&str> {
        let value = match slot {
            0 => &self.milestones0,
            1 => &self.milestones1,
            2 => &self.milestones2,
            3 => &self.milestones3,
            4 => &self.milestones4,
            5 => &self.milestones5,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn milestone_mut(&mut self, slot: usize) -> Option<&mut Option<String>> {
        match slot {
            0 => Some(&mut self.milestones0),
            1 => Some(&mut self.milestones1),
            2 => Some(&mut self.milestones2),
            3 => Some(&mut self.milestones3),
            4 => Some(&mut self.milestones4),
            5 => Some(&mut self.milestones5),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.milestone(5).is_some()
    }

    pub fn status(&self) -> ProjectStatus {
        if self.is_finished() {
            ProjectStatus::Finished
        } else {
            ProjectStatus::Ongoing
        }
    }

    pub fn budget_status(&self) -> BudgetStatus {
        match (self.budget_actual_usd, self.budget_planned_usd) {
            (Some(actual), Some(planned)) if actual > planned => BudgetStatus::OverBudget,
            (Some(_), Some(_)) => BudgetStatus::WithinBudget,
            _ => BudgetStatus::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_only_when_end_date_is_non_empty() {
        let mut project = Project::default();
        assert_eq!(project.status(), ProjectStatus::Ongoing);

        project.milestones5 = Some(String::new());
        assert!(!project.is_finished());

        project.milestones5 = Some("2024-06-01".to_string());
        assert!(project.is_finished());
        assert_eq!(project.status().to_string(), "FINISHED");
    }

    #[test]
    fn budget_status_compares_actual_against_planned() {
        let mut project = Project {
            budget_actual_usd: Some(1200.0),
            budget_planned_usd: Some(1000.0),
            ..Default::default()
        };
        assert_eq!(project.budget_status(), BudgetStatus::OverBudget);

        project.budget_actual_usd = Some(1000.0);
        assert_eq!(project.budget_status(), BudgetStatus::WithinBudget);

        project.budget_planned_usd = None;
        assert_eq!(project.budget_status(), BudgetStatus::Unknown);
    }

    #[test]
    fn milestone_lookup_ignores_out_of_range_slots() {
        let mut project = Project::default();
        *project.milestone_mut(2).unwrap() = Some("2024-03-01".to_string());
        assert_eq!(project.milestone(2), Some("2024-03-01"));
        assert_eq!(project.milestone(6), None);
        assert!(project.milestone_mut(6).is_none());
    }
}
