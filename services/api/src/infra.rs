use metrics_exporter_prometheus::PrometheusHandle;
use outlet_audit::audit::{
    AuditRepository, Caller, CallerDirectory, ChecklistPoint, ChecklistResponse, Division,
    DivisionId, Outlet, OutletId, RepositoryError, Visit, VisitId, VisitQuery,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Default)]
struct AuditTables {
    divisions: Vec<Division>,
    outlets: Vec<Outlet>,
    points: Vec<ChecklistPoint>,
    visits: Vec<Visit>,
    responses: Vec<ChecklistResponse>,
}

/// Process-local audit store. Reference data is loaded up front; only checklist
/// responses change at runtime.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditRepository {
    tables: Arc<Mutex<AuditTables>>,
}

impl InMemoryAuditRepository {
    pub(crate) fn load(
        &self,
        divisions: Vec<Division>,
        outlets: Vec<Outlet>,
        points: Vec<ChecklistPoint>,
        visits: Vec<Visit>,
        responses: Vec<ChecklistResponse>,
    ) {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        *guard = AuditTables {
            divisions,
            outlets,
            points,
            visits,
            responses,
        };
    }
}

impl AuditRepository for InMemoryAuditRepository {
    fn visit(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.visits.iter().find(|visit| visit.id == id).cloned())
    }

    fn visits(&self, query: &VisitQuery) -> Result<Vec<Visit>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        let divisions: HashMap<OutletId, DivisionId> = guard
            .outlets
            .iter()
            .map(|outlet| (outlet.id, outlet.division_id))
            .collect();
        Ok(guard
            .visits
            .iter()
            .filter(|visit| query.matches(visit, divisions.get(&visit.outlet_id).copied()))
            .cloned()
            .collect())
    }

    fn outlet(&self, id: OutletId) -> Result<Option<Outlet>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.outlets.iter().find(|outlet| outlet.id == id).cloned())
    }

    fn outlets(&self) -> Result<Vec<Outlet>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.outlets.clone())
    }

    fn division(&self, id: DivisionId) -> Result<Option<Division>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard
            .divisions
            .iter()
            .find(|division| division.id == id)
            .cloned())
    }

    fn divisions(&self) -> Result<Vec<Division>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.divisions.clone())
    }

    fn checklist_points(&self) -> Result<Vec<ChecklistPoint>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.points.clone())
    }

    fn responses_for_visits(
        &self,
        visits: &[VisitId],
    ) -> Result<Vec<ChecklistResponse>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard
            .responses
            .iter()
            .filter(|response| visits.contains(&response.visit_id))
            .cloned()
            .collect())
    }

    fn upsert_response(&self, response: ChecklistResponse) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if !guard.visits.iter().any(|visit| visit.id == response.visit_id) {
            return Err(RepositoryError::NotFound);
        }
        let position = guard.responses.iter().position(|existing| {
            existing.visit_id == response.visit_id
                && existing.checklist_point_id == response.checklist_point_id
        });
        match position {
            Some(index) => guard.responses[index] = response,
            None => guard.responses.push(response),
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCallerDirectory {
    tokens: Arc<Mutex<HashMap<String, Caller>>>,
}

impl InMemoryCallerDirectory {
    pub(crate) fn register(&self, token: impl Into<String>, caller: Caller) {
        let mut guard = self.tokens.lock().expect("caller mutex poisoned");
        guard.insert(token.into(), caller);
    }

    pub(crate) fn tokens(&self) -> Vec<(String, Caller)> {
        let guard = self.tokens.lock().expect("caller mutex poisoned");
        let mut entries: Vec<(String, Caller)> = guard
            .iter()
            .map(|(token, caller)| (token.clone(), caller.clone()))
            .collect();
        entries.sort_by_key(|(_, caller)| caller.user_id);
        entries
    }
}

impl CallerDirectory for InMemoryCallerDirectory {
    fn resolve(&self, token: &str) -> Result<Option<Caller>, RepositoryError> {
        let guard = self.tokens.lock().expect("caller mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}
