use super::super::domain::{
    ChecklistPointId, DateRange, DivisionId, OutletId, UserId, VisitId, VisitStatus,
};
use super::super::scoring::{ScoreResult, ScoreStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Wire form of a score: the aggregate plus the badge colour the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreView {
    #[serde(flatten)]
    pub score: ScoreResult,
    pub status_color: &'static str,
}

impl From<ScoreResult> for ScoreView {
    fn from(score: ScoreResult) -> Self {
        Self {
            status_color: score.status.color(),
            score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryScoreEntry {
    pub category: String,
    pub score: ScoreView,
}

#[derive(Debug, Clone, Serialize)]
pub struct NokPointEntry {
    pub checklist_point_id: ChecklistPointId,
    pub category: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nok_remark: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitReport {
    pub visit_id: VisitId,
    pub outlet_id: OutletId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_name: Option<String>,
    pub auditor_id: UserId,
    pub visit_date: NaiveDate,
    pub visit_status: VisitStatus,
    pub visit_status_label: &'static str,
    pub score: ScoreView,
    pub categories: Vec<CategoryScoreEntry>,
    pub nok_points: Vec<NokPointEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitScoreEntry {
    pub visit_id: VisitId,
    pub visit_date: NaiveDate,
    pub auditor_id: UserId,
    pub score: ScoreView,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutletReport {
    pub outlet_id: OutletId,
    pub outlet_code: String,
    pub outlet_name: String,
    pub division_id: DivisionId,
    pub range: DateRange,
    pub visit_count: usize,
    pub score: ScoreView,
    pub visits: Vec<VisitScoreEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutletScoreEntry {
    pub rank: usize,
    pub outlet_id: OutletId,
    pub outlet_code: String,
    pub outlet_name: String,
    pub visit_count: usize,
    pub score: ScoreView,
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionReport {
    pub division_id: DivisionId,
    pub division_name: String,
    pub range: DateRange,
    pub visit_count: usize,
    pub score: ScoreView,
    pub outlets: Vec<OutletScoreEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionScoreEntry {
    pub division_id: DivisionId,
    pub division_name: String,
    pub outlet_count: usize,
    pub visit_count: usize,
    pub score: ScoreView,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailingPointEntry {
    pub checklist_point_id: ChecklistPointId,
    pub category: String,
    pub question: String,
    pub nok_count: u64,
    pub total_scored: u64,
    pub nok_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub range: DateRange,
    pub visit_count: usize,
    pub score: ScoreView,
    pub divisions: Vec<DivisionScoreEntry>,
    pub top_failing_points: Vec<FailingPointEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitStatusCount {
    pub status: VisitStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusTierCount {
    pub status: ScoreStatus,
    pub status_color: &'static str,
    pub outlets: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub range: DateRange,
    pub visits_by_status: Vec<VisitStatusCount>,
    pub completed_score: ScoreView,
    pub outlets_by_status: Vec<StatusTierCount>,
}
