use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::audit::access::AccessPolicy;
use crate::audit::domain::{
    Caller, ChecklistPoint, ChecklistPointId, ChecklistResponse, Division, DivisionId, Outlet,
    OutletId, UserId, UserRole, Visit, VisitId, VisitStatus,
};
use crate::audit::repository::{AuditRepository, CallerDirectory, RepositoryError, VisitQuery};
use crate::audit::{report_router, AuditReportService};

pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const SUPERVISOR_TOKEN: &str = "supervisor-token";
pub(super) const AUDITOR_TOKEN: &str = "auditor-token";

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn admin() -> Caller {
    Caller {
        user_id: UserId(1),
        name: "Avery Admin".to_string(),
        role: UserRole::Admin,
        division_id: None,
    }
}

pub(super) fn south_supervisor() -> Caller {
    Caller {
        user_id: UserId(2),
        name: "Sam Supervisor".to_string(),
        role: UserRole::Supervisor,
        division_id: Some(DivisionId(20)),
    }
}

pub(super) fn auditor() -> Caller {
    Caller {
        user_id: UserId(7),
        name: "Alex Auditor".to_string(),
        role: UserRole::Auditor,
        division_id: Some(DivisionId(10)),
    }
}

fn visit(id: u64, outlet: u64, auditor: u64, on: NaiveDate, status: VisitStatus) -> Visit {
    Visit {
        id: VisitId(id),
        outlet_id: OutletId(outlet),
        auditor_id: UserId(auditor),
        visit_date: on,
        status,
    }
}

fn answers(visit_id: u64, raw: &[&str]) -> Vec<ChecklistResponse> {
    raw.iter()
        .enumerate()
        .map(|(offset, value)| ChecklistResponse {
            visit_id: VisitId(visit_id),
            checklist_point_id: ChecklistPointId(offset as u64 + 1),
            response: value.to_string(),
            notes: None,
            nok_remark: None,
        })
        .collect()
}

/// Two divisions, three outlets and a mix of visit states:
///
/// - 100: outlet 1, completed, OK/OK/OK/NOT OK/NA (75.0, Warning)
/// - 101: outlet 1, completed, all ok (100.0, Good)
/// - 102: outlet 2, completed, messy spellings plus one unknown (33.3, Critical)
/// - 103: outlet 3, completed, four OK one NOT OK (80.0, Warning)
/// - 104: outlet 3, in progress
/// - 105: outlet 2, scheduled
/// - 106: outlet 1, cancelled with a NOT OK that must never count
pub(super) fn seeded_repository() -> MemoryRepository {
    let repository = MemoryRepository::default();
    {
        let mut data = repository.data.lock().expect("repository mutex poisoned");
        data.divisions = vec![
            Division {
                id: DivisionId(10),
                name: "North".to_string(),
            },
            Division {
                id: DivisionId(20),
                name: "South".to_string(),
            },
        ];
        data.outlets = [
            (1, "N-001", "Central Plaza", 10),
            (2, "N-002", "Harbour Mall", 10),
            (3, "S-001", "Riverside", 20),
        ]
        .into_iter()
        .map(|(id, code, name, division)| Outlet {
            id: OutletId(id),
            code: code.to_string(),
            name: name.to_string(),
            division_id: DivisionId(division),
        })
        .collect();
        data.points = [
            (1, "Cleanliness", "Floor is clean"),
            (2, "Cleanliness", "Shelves are dusted"),
            (3, "Stock", "Price tags are visible"),
            (4, "Stock", "Expired items removed"),
            (5, "Safety", "Fire exit is clear"),
        ]
        .into_iter()
        .map(|(id, category, question)| ChecklistPoint {
            id: ChecklistPointId(id),
            category: category.to_string(),
            question: question.to_string(),
        })
        .collect();
        data.visits = vec![
            visit(100, 1, 7, date(3, 3), VisitStatus::Completed),
            visit(101, 1, 8, date(3, 20), VisitStatus::Completed),
            visit(102, 2, 7, date(3, 10), VisitStatus::Completed),
            visit(103, 3, 8, date(4, 2), VisitStatus::Completed),
            visit(104, 3, 7, date(4, 5), VisitStatus::InProgress),
            visit(105, 2, 8, date(2, 1), VisitStatus::Scheduled),
            visit(106, 1, 8, date(3, 25), VisitStatus::Cancelled),
        ];

        let mut responses = answers(100, &["OK", "OK", "OK", "NOT OK", "NA"]);
        responses[3].notes = Some("Expired yoghurt on shelf".to_string());
        responses[3].nok_remark = Some("Pull stock before opening".to_string());
        responses.extend(answers(101, &["ok", "ok", "ok", "ok", "ok"]));
        responses.extend(answers(102, &["not_ok", "NOT OK", "OK", "n/a", "garbage"]));
        responses.extend(answers(103, &["OK", "OK", "OK", "OK", "NOT OK"]));
        responses.extend(answers(104, &["OK"]));
        responses.extend(answers(106, &["NOT OK"]));
        data.responses = responses;
    }
    repository
}

#[derive(Debug, Default)]
pub(super) struct AuditData {
    pub(super) divisions: Vec<Division>,
    pub(super) outlets: Vec<Outlet>,
    pub(super) points: Vec<ChecklistPoint>,
    pub(super) visits: Vec<Visit>,
    pub(super) responses: Vec<ChecklistResponse>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) data: Arc<Mutex<AuditData>>,
}

impl AuditRepository for MemoryRepository {
    fn visit(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        let data = self.data.lock().expect("repository mutex poisoned");
        Ok(data.visits.iter().find(|visit| visit.id == id).cloned())
    }

    fn visits(&self, query: &VisitQuery) -> Result<Vec<Visit>, RepositoryError> {
        let data = self.data.lock().expect("repository mutex poisoned");
        Ok(data
            .visits
            .iter()
            .filter(|visit| {
                let division = data
                    .outlets
                    .iter()
                    .find(|outlet| outlet.id == visit.outlet_id)
                    .map(|outlet| outlet.division_id);
                query.matches(visit, division)
            })
            .cloned()
            .collect())
    }

    fn outlet(&self, id: OutletId) -> Result<Option<Outlet>, RepositoryError> {
        let data = self.data.lock().expect("repository mutex poisoned");
        Ok(data.outlets.iter().find(|outlet| outlet.id == id).cloned())
    }

    fn outlets(&self) -> Result<Vec<Outlet>, RepositoryError> {
        Ok(self.data.lock().expect("repository mutex poisoned").outlets.clone())
    }

    fn division(&self, id: DivisionId) -> Result<Option<Division>, RepositoryError> {
        let data = self.data.lock().expect("repository mutex poisoned");
        Ok(data
            .divisions
            .iter()
            .find(|division| division.id == id)
            .cloned())
    }

    fn divisions(&self) -> Result<Vec<Division>, RepositoryError> {
        Ok(self
            .data
            .lock()
            .expect("repository mutex poisoned")
            .divisions
            .clone())
    }

    fn checklist_points(&self) -> Result<Vec<ChecklistPoint>, RepositoryError> {
        Ok(self.data.lock().expect("repository mutex poisoned").points.clone())
    }

    fn responses_for_visits(
        &self,
        visits: &[VisitId],
    ) -> Result<Vec<ChecklistResponse>, RepositoryError> {
        let data = self.data.lock().expect("repository mutex poisoned");
        Ok(data
            .responses
            .iter()
            .filter(|response| visits.contains(&response.visit_id))
            .cloned()
            .collect())
    }

    fn upsert_response(&self, response: ChecklistResponse) -> Result<(), RepositoryError> {
        let mut data = self.data.lock().expect("repository mutex poisoned");
        data.responses.retain(|existing| {
            !(existing.visit_id == response.visit_id
                && existing.checklist_point_id == response.checklist_point_id)
        });
        data.responses.push(response);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl AuditRepository for UnavailableRepository {
    fn visit(&self, _id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn visits(&self, _query: &VisitQuery) -> Result<Vec<Visit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn outlet(&self, _id: OutletId) -> Result<Option<Outlet>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn outlets(&self) -> Result<Vec<Outlet>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn division(&self, _id: DivisionId) -> Result<Option<Division>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn divisions(&self) -> Result<Vec<Division>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn checklist_points(&self) -> Result<Vec<ChecklistPoint>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn responses_for_visits(
        &self,
        _visits: &[VisitId],
    ) -> Result<Vec<ChecklistResponse>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_response(&self, _response: ChecklistResponse) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Clone)]
pub(super) struct MemoryCallers {
    tokens: HashMap<String, Caller>,
}

impl Default for MemoryCallers {
    fn default() -> Self {
        let tokens = [
            (ADMIN_TOKEN, admin()),
            (SUPERVISOR_TOKEN, south_supervisor()),
            (AUDITOR_TOKEN, auditor()),
        ]
        .into_iter()
        .map(|(token, caller)| (token.to_string(), caller))
        .collect();
        Self { tokens }
    }
}

impl CallerDirectory for MemoryCallers {
    fn resolve(&self, token: &str) -> Result<Option<Caller>, RepositoryError> {
        Ok(self.tokens.get(token).cloned())
    }
}

pub(super) fn build_service(
    restrict_by_role: bool,
) -> (
    AuditReportService<MemoryRepository, MemoryCallers>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(seeded_repository());
    let service = AuditReportService::new(
        repository.clone(),
        Arc::new(MemoryCallers::default()),
        AccessPolicy { restrict_by_role },
    );
    (service, repository)
}

pub(super) fn router_with_policy(restrict_by_role: bool) -> axum::Router {
    let (service, _) = build_service(restrict_by_role);
    report_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
