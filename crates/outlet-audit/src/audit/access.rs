use super::domain::{Caller, DivisionId, Outlet, OutletId, UserRole, Visit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Controls which visits an authenticated caller may aggregate over.
///
/// With `restrict_by_role` off every authenticated caller sees all data, which is
/// how the dashboard currently behaves. Turning it on limits supervisors to their
/// own division and auditors to the visits they conducted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub restrict_by_role: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessFilter {
    policy: AccessPolicy,
}

impl AccessFilter {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Whether `caller` may see `visit`. `outlet_division` is the division of the
    /// visit's outlet, when known.
    pub fn permits(
        &self,
        caller: &Caller,
        visit: &Visit,
        outlet_division: Option<DivisionId>,
    ) -> bool {
        if !self.policy.restrict_by_role {
            return true;
        }

        match caller.role {
            UserRole::Admin | UserRole::Manager => true,
            UserRole::Supervisor => match (caller.division_id, outlet_division) {
                (Some(own), Some(division)) => own == division,
                _ => false,
            },
            UserRole::Auditor => visit.auditor_id == caller.user_id,
        }
    }

    /// Narrow a requested set of visits down to those the caller may see.
    pub fn visible_scope<'a>(
        &self,
        caller: &Caller,
        visits: &'a [Visit],
        outlets: &HashMap<OutletId, Outlet>,
    ) -> Vec<&'a Visit> {
        let visible: Vec<&Visit> = visits
            .iter()
            .filter(|visit| {
                let division = outlets.get(&visit.outlet_id).map(|outlet| outlet.division_id);
                self.permits(caller, visit, division)
            })
            .collect();

        debug!(
            user_id = %caller.user_id,
            role = caller.role.label(),
            restrict_by_role = self.policy.restrict_by_role,
            requested = visits.len(),
            visible = visible.len(),
            "access filter applied"
        );

        visible
    }
}
