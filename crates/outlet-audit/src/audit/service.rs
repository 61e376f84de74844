use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::access::{AccessFilter, AccessPolicy};
use super::domain::{
    Caller, ChecklistAnswer, ChecklistPointId, ChecklistResponse, DateRange, DivisionId,
    InvalidAnswer, InvalidDateRange, Outlet, OutletId, Visit, VisitId, VisitStatus,
};
use super::report::views::{
    DashboardSummary, DivisionReport, OutletReport, RangeReport, VisitReport,
};
use super::report::{
    build_dashboard, build_division_report, build_outlet_report, build_range_report,
    build_visit_report, ResponseIndex,
};
use super::repository::{AuditRepository, CallerDirectory, RepositoryError, VisitQuery};

/// Answer submitted for one checklist point of an in-progress visit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ResponseSubmission {
    pub response: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub nok_remark: Option<String>,
}

/// Service composing the repository, caller directory, and access filter with the
/// scoring core. Every report recomputes scores from the stored responses.
pub struct AuditReportService<R, C> {
    repository: Arc<R>,
    callers: Arc<C>,
    access: AccessFilter,
}

impl<R, C> AuditReportService<R, C>
where
    R: AuditRepository + 'static,
    C: CallerDirectory + 'static,
{
    pub fn new(repository: Arc<R>, callers: Arc<C>, policy: AccessPolicy) -> Self {
        Self {
            repository,
            callers,
            access: AccessFilter::new(policy),
        }
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.access.policy()
    }

    /// Resolve a bearer token. Blank or unknown tokens are rejected before any
    /// report logic runs.
    pub fn authenticate(&self, token: &str) -> Result<Caller, ReportError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ReportError::Unauthenticated);
        }

        self.callers
            .resolve(token)?
            .ok_or(ReportError::Unauthenticated)
    }

    /// Score a single visit regardless of its lifecycle status.
    pub fn visit_report(
        &self,
        caller: &Caller,
        visit_id: VisitId,
    ) -> Result<VisitReport, ReportError> {
        let (visit, outlet) = self.visible_visit(caller, visit_id)?;
        let responses = self.repository.responses_for_visits(&[visit.id])?;
        let points = self.repository.checklist_points()?;

        let report = build_visit_report(&visit, outlet.as_ref(), &responses, &points);
        info!(
            user_id = %caller.user_id,
            visit_id = %visit.id,
            status = report.score.score.status.label(),
            "visit report generated"
        );
        Ok(report)
    }

    /// Score the completed visits of one outlet.
    pub fn outlet_report(
        &self,
        caller: &Caller,
        outlet_id: OutletId,
        range: DateRange,
    ) -> Result<OutletReport, ReportError> {
        let outlet = self
            .repository
            .outlet(outlet_id)?
            .ok_or(ReportError::OutletNotFound(outlet_id))?;

        let visits = self
            .repository
            .visits(&VisitQuery::completed().for_outlet(outlet_id).within(range))?;
        let outlets = HashMap::from([(outlet.id, outlet.clone())]);
        let visible = self.access.visible_scope(caller, &visits, &outlets);
        let index = self.index_for(&visible)?;

        let report = build_outlet_report(&outlet, range, &visible, &index);
        info!(
            user_id = %caller.user_id,
            outlet_id = %outlet.id,
            visits = report.visit_count,
            status = report.score.score.status.label(),
            "outlet report generated"
        );
        Ok(report)
    }

    /// Score the completed visits of every outlet in a division, ranking outlets.
    pub fn division_report(
        &self,
        caller: &Caller,
        division_id: DivisionId,
        range: DateRange,
    ) -> Result<DivisionReport, ReportError> {
        let division = self
            .repository
            .division(division_id)?
            .ok_or(ReportError::DivisionNotFound(division_id))?;

        let visits = self.repository.visits(
            &VisitQuery::completed()
                .for_division(division_id)
                .within(range),
        )?;
        let outlets = self.outlet_index()?;
        let visible = self.access.visible_scope(caller, &visits, &outlets);
        let index = self.index_for(&visible)?;

        let report = build_division_report(&division, range, &outlets, &visible, &index);
        info!(
            user_id = %caller.user_id,
            division_id = %division.id,
            outlets = report.outlets.len(),
            visits = report.visit_count,
            "division report generated"
        );
        Ok(report)
    }

    /// Score every visible completed visit within a date range.
    pub fn range_report(
        &self,
        caller: &Caller,
        range: DateRange,
    ) -> Result<RangeReport, ReportError> {
        let visits = self
            .repository
            .visits(&VisitQuery::completed().within(range))?;
        let outlets = self.outlet_index()?;
        let visible = self.access.visible_scope(caller, &visits, &outlets);
        let index = self.index_for(&visible)?;
        let divisions = self.repository.divisions()?;
        let points = self.repository.checklist_points()?;

        let report = build_range_report(range, &divisions, &outlets, &visible, &index, &points);
        info!(
            user_id = %caller.user_id,
            visits = report.visit_count,
            divisions = report.divisions.len(),
            "range report generated"
        );
        Ok(report)
    }

    /// Visit counts by lifecycle status plus score tiers for visible outlets.
    pub fn dashboard(
        &self,
        caller: &Caller,
        range: DateRange,
    ) -> Result<DashboardSummary, ReportError> {
        let visits = self.repository.visits(&VisitQuery {
            range,
            ..VisitQuery::default()
        })?;
        let outlets = self.outlet_index()?;
        let visible = self.access.visible_scope(caller, &visits, &outlets);
        let completed: Vec<&Visit> = visible
            .iter()
            .copied()
            .filter(|visit| visit.status.counts_toward_reports())
            .collect();
        let index = self.index_for(&completed)?;

        Ok(build_dashboard(range, &visible, &index))
    }

    /// Record an answer on an in-progress visit. Only canonical answer spellings
    /// are accepted, so new rows never need normalizing.
    pub fn record_response(
        &self,
        caller: &Caller,
        visit_id: VisitId,
        checklist_point_id: ChecklistPointId,
        submission: ResponseSubmission,
    ) -> Result<ChecklistResponse, ReportError> {
        let (visit, _) = self.visible_visit(caller, visit_id)?;
        let answer: ChecklistAnswer = submission.response.parse()?;

        if visit.status != VisitStatus::InProgress {
            return Err(ReportError::VisitNotEditable {
                visit_id,
                status: visit.status,
            });
        }

        let known_point = self
            .repository
            .checklist_points()?
            .iter()
            .any(|point| point.id == checklist_point_id);
        if !known_point {
            return Err(ReportError::UnknownChecklistPoint(checklist_point_id));
        }

        let response = ChecklistResponse {
            visit_id,
            checklist_point_id,
            response: answer.as_stored().to_string(),
            notes: non_blank(submission.notes),
            nok_remark: match answer {
                ChecklistAnswer::NotOk => non_blank(submission.nok_remark),
                _ => None,
            },
        };
        self.repository.upsert_response(response.clone())?;

        info!(
            user_id = %caller.user_id,
            visit_id = %visit_id,
            checklist_point_id = %checklist_point_id,
            answer = answer.as_stored(),
            "checklist response recorded"
        );
        Ok(response)
    }

    fn visible_visit(
        &self,
        caller: &Caller,
        visit_id: VisitId,
    ) -> Result<(Visit, Option<Outlet>), ReportError> {
        let visit = self
            .repository
            .visit(visit_id)?
            .ok_or(ReportError::VisitNotFound(visit_id))?;
        let outlet = self.repository.outlet(visit.outlet_id)?;

        let division = outlet.as_ref().map(|outlet| outlet.division_id);
        if !self.access.permits(caller, &visit, division) {
            warn!(
                user_id = %caller.user_id,
                role = caller.role.label(),
                visit_id = %visit_id,
                "visit hidden by access policy"
            );
            return Err(ReportError::Forbidden(visit_id));
        }

        Ok((visit, outlet))
    }

    fn outlet_index(&self) -> Result<HashMap<OutletId, Outlet>, ReportError> {
        Ok(self
            .repository
            .outlets()?
            .into_iter()
            .map(|outlet| (outlet.id, outlet))
            .collect())
    }

    fn index_for(&self, visits: &[&Visit]) -> Result<ResponseIndex, ReportError> {
        if visits.is_empty() {
            return Ok(ResponseIndex::default());
        }
        let ids: Vec<VisitId> = visits.iter().map(|visit| visit.id).collect();
        let responses = self.repository.responses_for_visits(&ids)?;
        Ok(ResponseIndex::build(&responses))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("visit {0} is not visible to the caller")]
    Forbidden(VisitId),
    #[error("visit {0} not found")]
    VisitNotFound(VisitId),
    #[error("outlet {0} not found")]
    OutletNotFound(OutletId),
    #[error("division {0} not found")]
    DivisionNotFound(DivisionId),
    #[error("checklist point {0} not found")]
    UnknownChecklistPoint(ChecklistPointId),
    #[error("visit {visit_id} is {} and no longer accepts responses", .status.label())]
    VisitNotEditable {
        visit_id: VisitId,
        status: VisitStatus,
    },
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error(transparent)]
    InvalidRange(#[from] InvalidDateRange),
    #[error(transparent)]
    InvalidAnswer(#[from] InvalidAnswer),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
