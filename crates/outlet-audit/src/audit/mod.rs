//! Outlet audit scoring: checklist responses in, OK/NOT OK percentages and
//! Good/Warning/Critical ratings out, scoped per visit, outlet, division, or
//! date range.

pub mod access;
pub mod domain;
pub mod import;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use access::{AccessFilter, AccessPolicy};
pub use domain::{
    parse_date, Caller, ChecklistAnswer, ChecklistPoint, ChecklistPointId, ChecklistResponse,
    DateRange, Division, DivisionId, InvalidAnswer, InvalidDateRange, Outlet, OutletId, UserId,
    UserRole, Visit, VisitId, VisitStatus,
};
pub use import::{ChecklistResponseImporter, ImportedResponses, ResponseImportError};
pub use repository::{AuditRepository, CallerDirectory, RepositoryError, VisitQuery};
pub use router::report_router;
pub use scoring::{aggregate, classify, normalize, NormalizedResponse, ScoreResult, ScoreStatus};
pub use service::{AuditReportService, ReportError, ResponseSubmission};
