use super::domain::{
    Caller, ChecklistPoint, ChecklistResponse, DateRange, Division, DivisionId, Outlet, OutletId,
    Visit, VisitId, VisitStatus,
};

/// Filter applied by the storage layer before responses reach the scoring core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitQuery {
    pub outlet_id: Option<OutletId>,
    pub division_id: Option<DivisionId>,
    pub range: DateRange,
    pub status: Option<VisitStatus>,
}

impl VisitQuery {
    /// Visits that feed reporting aggregates.
    pub fn completed() -> Self {
        Self {
            status: Some(VisitStatus::Completed),
            ..Self::default()
        }
    }

    pub fn for_outlet(mut self, outlet_id: OutletId) -> Self {
        self.outlet_id = Some(outlet_id);
        self
    }

    pub fn for_division(mut self, division_id: DivisionId) -> Self {
        self.division_id = Some(division_id);
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Evaluate the query against a visit whose outlet belongs to `division`.
    pub fn matches(&self, visit: &Visit, division: Option<DivisionId>) -> bool {
        self.outlet_id.map_or(true, |id| visit.outlet_id == id)
            && self.division_id.map_or(true, |id| division == Some(id))
            && self.status.map_or(true, |status| visit.status == status)
            && self.range.contains(visit.visit_date)
    }
}

/// Storage abstraction over visits, outlets and checklist responses.
pub trait AuditRepository: Send + Sync {
    fn visit(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError>;
    fn visits(&self, query: &VisitQuery) -> Result<Vec<Visit>, RepositoryError>;
    fn outlet(&self, id: OutletId) -> Result<Option<Outlet>, RepositoryError>;
    fn outlets(&self) -> Result<Vec<Outlet>, RepositoryError>;
    fn division(&self, id: DivisionId) -> Result<Option<Division>, RepositoryError>;
    fn divisions(&self) -> Result<Vec<Division>, RepositoryError>;
    fn checklist_points(&self) -> Result<Vec<ChecklistPoint>, RepositoryError>;
    fn responses_for_visits(
        &self,
        visits: &[VisitId],
    ) -> Result<Vec<ChecklistResponse>, RepositoryError>;
    /// Insert or replace the response for `(visit_id, checklist_point_id)`.
    fn upsert_response(&self, response: ChecklistResponse) -> Result<(), RepositoryError>;
}

/// Resolves bearer tokens to callers. Session mechanics live behind this trait.
pub trait CallerDirectory: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Option<Caller>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
