/// Which report result counts as "done", and which status a finished
/// structure is promoted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRule {
    pub complete_result_id: i64,
    pub completed_status_id: i64,
}

impl Default for CompletionRule {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl CompletionRule {
    pub fn new(complete_result_id: i64, completed_status_id: i64) -> Self {
        Self { complete_result_id, completed_status_id }
    }

    pub fn is_complete(&self, result_id: i64) -> bool {
        result_id == self.complete_result_id
    }

    pub fn is_completed_status(&self, status_id: Option<i64>) -> bool {
        status_id == Some(self.completed_status_id)
    }
}

/// Lifecycle of a single structure activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl ActivityStatus {
    /// Status implied by a stored report result.
    pub fn from_result(result_id: Option<i64>, rule: &CompletionRule) -> Self {
        match result_id {
            None => ActivityStatus::Pending,
            Some(r) if rule.is_complete(r) => ActivityStatus::Completed,
            Some(_) => ActivityStatus::InProgress,
        }
    }

    /// Apply a saved report. Completed is terminal.
    pub fn on_report(self, result_id: i64, rule: &CompletionRule) -> Self {
        match self {
            ActivityStatus::Completed => ActivityStatus::Completed,
            _ if rule.is_complete(result_id) => ActivityStatus::Completed,
            ActivityStatus::Pending => ActivityStatus::InProgress,
            other => other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityStatus::Pending => "Pendiente",
            ActivityStatus::InProgress => "En progreso",
            ActivityStatus::Completed => "Completado",
        }
    }
}
