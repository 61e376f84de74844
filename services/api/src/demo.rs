use crate::infra::{InMemoryAuditRepository, InMemoryCallerDirectory};
use chrono::NaiveDate;
use clap::Args;
use outlet_audit::audit::report::views::{
    DashboardSummary, DivisionReport, OutletReport, RangeReport, ScoreView, VisitReport,
};
use outlet_audit::audit::{
    parse_date, AccessPolicy, AuditReportService, Caller, ChecklistPoint, ChecklistPointId,
    ChecklistResponse, ChecklistResponseImporter, DateRange, Division, DivisionId, Outlet,
    OutletId, ReportError, ScoreResult, UserId, UserRole, Visit, VisitId, VisitStatus,
};
use outlet_audit::error::AppError;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) const DEMO_ADMIN_TOKEN: &str = "demo-admin";

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Checklist response export (Visit ID, Checklist Point ID, Response, Notes, NOK Remark)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print the scores as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Bearer token of the demo user to report as
    #[arg(long, default_value = DEMO_ADMIN_TOKEN)]
    pub(crate) token: String,
    /// Scope report data to the caller's role
    #[arg(long)]
    pub(crate) restrict_by_role: bool,
    /// First visit date included in aggregate reports (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Last visit date included in aggregate reports (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct ScoreExport {
    overall: ScoreView,
    visits: Vec<VisitScoreLine>,
}

#[derive(Debug, Serialize)]
struct VisitScoreLine {
    visit_id: VisitId,
    score: ScoreView,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let imported = ChecklistResponseImporter::from_path(&args.csv)?;
    let export = ScoreExport {
        overall: imported.overall().into(),
        visits: imported
            .by_visit()
            .into_iter()
            .map(|(visit_id, score)| VisitScoreLine {
                visit_id,
                score: score.into(),
            })
            .collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!(
        "Scored {} responses across {} visits from {}",
        imported.responses().len(),
        export.visits.len(),
        args.csv.display()
    );
    for line in &export.visits {
        println!("- Visit {}: {}", line.visit_id, describe_score(&line.score.score));
    }
    println!("Overall: {}", describe_score(&export.overall.score));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        token,
        restrict_by_role,
        from,
        to,
    } = args;

    let range = DateRange::new(from, to).map_err(ReportError::from)?;
    let repository = InMemoryAuditRepository::default();
    let callers = InMemoryCallerDirectory::default();
    seed_demo_store(&repository, &callers);

    let service = AuditReportService::new(
        Arc::new(repository),
        Arc::new(callers),
        AccessPolicy { restrict_by_role },
    );
    let caller = service.authenticate(&token)?;

    println!(
        "Outlet audit demo as {} ({})",
        caller.name,
        caller.role.label()
    );
    if restrict_by_role {
        println!("Role-based scoping enabled");
    }

    match service.visit_report(&caller, VisitId(1001)) {
        Ok(report) => render_visit_report(&report),
        Err(err) => println!("\nVisit 1001 unavailable: {err}"),
    }

    let dashboard = service.dashboard(&caller, range)?;
    render_dashboard(&dashboard);

    let summary = service.range_report(&caller, range)?;
    render_range_report(&summary);

    for division in &summary.divisions {
        let report = service.division_report(&caller, division.division_id, range)?;
        render_division_report(&report);
        for outlet in &report.outlets {
            let report = service.outlet_report(&caller, outlet.outlet_id, range)?;
            render_outlet_report(&report);
        }
    }

    Ok(())
}

/// Loads the sample audit round: two divisions, three outlets, six checklist
/// points and a March 2025 visit schedule, plus one token per role.
pub(crate) fn seed_demo_store(
    repository: &InMemoryAuditRepository,
    callers: &InMemoryCallerDirectory,
) {
    let divisions = vec![
        Division {
            id: DivisionId(1),
            name: "Metro".to_string(),
        },
        Division {
            id: DivisionId(2),
            name: "Coastal".to_string(),
        },
    ];
    let outlets = vec![
        outlet(11, "MET-01", "Central Station", 1),
        outlet(12, "MET-02", "Market Square", 1),
        outlet(21, "CST-01", "Harbourfront", 2),
    ];
    let points = vec![
        point(1, "Cleanliness", "Floors swept and dry"),
        point(2, "Cleanliness", "Counters sanitised"),
        point(3, "Stock", "Shelves fully faced"),
        point(4, "Stock", "Expired items removed"),
        point(5, "Safety", "Fire exits clear"),
        point(6, "Safety", "First aid kit stocked"),
    ];
    let visits = vec![
        visit(1001, 11, 4, demo_date(3, 4), VisitStatus::Completed),
        visit(1002, 11, 4, demo_date(3, 18), VisitStatus::Completed),
        visit(1003, 12, 4, demo_date(3, 6), VisitStatus::Completed),
        visit(1004, 21, 5, demo_date(3, 11), VisitStatus::Completed),
        visit(1005, 21, 4, demo_date(3, 25), VisitStatus::InProgress),
        visit(1006, 12, 4, demo_date(4, 2), VisitStatus::Scheduled),
    ];

    let mut responses = Vec::new();
    responses.extend(answers(1001, &["OK", "OK", "OK", "OK", "OK", "NOT OK"]));
    responses.extend(answers(1002, &["OK"; 6]));
    responses.extend(answers(1003, &["ok", "NOT_OK", "na", "OK", "not ok", "OK"]));
    responses.extend(answers(1004, &["OK", "OK", "NOT OK", "OK", "N/A", "OK"]));
    responses.extend(answers(1005, &["OK", "N/A"]));
    remark(
        &mut responses,
        1001,
        6,
        "Bandages missing",
        "Restock from regional store",
    );
    remark(&mut responses, 1003, 2, "Sticky residue", "Retrain closing shift");
    remark(&mut responses, 1003, 5, "Pallets by rear door", "Clear before opening");
    remark(&mut responses, 1004, 3, "Gaps on dairy shelf", "Raise replenishment order");

    repository.load(divisions, outlets, points, visits, responses);

    callers.register(DEMO_ADMIN_TOKEN, user(1, "Morgan Admin", UserRole::Admin, None));
    callers.register(
        "demo-manager",
        user(2, "Riley Manager", UserRole::Manager, None),
    );
    callers.register(
        "demo-supervisor",
        user(3, "Jordan Supervisor", UserRole::Supervisor, Some(2)),
    );
    callers.register(
        "demo-auditor",
        user(4, "Casey Auditor", UserRole::Auditor, Some(1)),
    );
}

fn demo_date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default()
}

fn outlet(id: u64, code: &str, name: &str, division: u64) -> Outlet {
    Outlet {
        id: OutletId(id),
        code: code.to_string(),
        name: name.to_string(),
        division_id: DivisionId(division),
    }
}

fn point(id: u64, category: &str, question: &str) -> ChecklistPoint {
    ChecklistPoint {
        id: ChecklistPointId(id),
        category: category.to_string(),
        question: question.to_string(),
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

fn user(id: u64, name: &str, role: UserRole, division: Option<u64>) -> Caller {
    Caller {
        user_id: UserId(id),
        name: name.to_string(),
        role,
        division_id: division.map(DivisionId),
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

fn remark(
    responses: &mut [ChecklistResponse],
    visit_id: u64,
    point: u64,
    notes: &str,
    action: &str,
) {
    if let Some(response) = responses.iter_mut().find(|response| {
        response.visit_id == VisitId(visit_id)
            && response.checklist_point_id == ChecklistPointId(point)
    }) {
        response.notes = Some(notes.to_string());
        response.nok_remark = Some(action.to_string());
    }
}

fn describe_score(score: &ScoreResult) -> String {
    format!(
        "{:.1}% OK / {:.1}% NOT OK ({}) | {} OK, {} NOT OK, {} N/A, {} unrecognised",
        score.ok_percentage,
        score.nok_percentage,
        score.status.label(),
        score.ok_count,
        score.not_ok_count,
        score.na_count,
        score.unknown_count
    )
}

fn describe_range(range: &DateRange) -> String {
    match (range.from, range.to) {
        (None, None) => "all dates".to_string(),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("through {to}"),
        (Some(from), Some(to)) => format!("{from} to {to}"),
    }
}

fn render_visit_report(report: &VisitReport) {
    println!(
        "\nVisit {} at {} on {} [{}]",
        report.visit_id,
        report
            .outlet_name
            .as_deref()
            .unwrap_or("unknown outlet"),
        report.visit_date,
        report.visit_status_label
    );
    println!("  Score: {}", describe_score(&report.score.score));
    println!("  Categories:");
    for entry in &report.categories {
        println!(
            "    - {}: {:.1}% ({})",
            entry.category,
            entry.score.score.ok_percentage,
            entry.score.score.status.label()
        );
    }
    if report.nok_points.is_empty() {
        println!("  No failing checklist points");
        return;
    }
    println!("  Failing checklist points:");
    for point in &report.nok_points {
        println!(
            "    - #{} {} / {}",
            point.checklist_point_id, point.category, point.question
        );
        if let Some(remark) = &point.nok_remark {
            println!("      corrective action: {remark}");
        }
    }
}

fn render_dashboard(summary: &DashboardSummary) {
    println!("\nDashboard ({})", describe_range(&summary.range));
    let visits: Vec<String> = summary
        .visits_by_status
        .iter()
        .map(|entry| format!("{} {}", entry.count, entry.label))
        .collect();
    println!("- Visits: {}", visits.join(", "));
    println!(
        "- Completed visits: {}",
        describe_score(&summary.completed_score.score)
    );
    let tiers: Vec<String> = summary
        .outlets_by_status
        .iter()
        .map(|entry| format!("{} {}", entry.outlets, entry.status.label()))
        .collect();
    println!("- Outlets by rating: {}", tiers.join(", "));
}

fn render_range_report(report: &RangeReport) {
    println!(
        "\nSummary for {} ({} completed visits)",
        describe_range(&report.range),
        report.visit_count
    );
    println!("- Overall: {}", describe_score(&report.score.score));
    for division in &report.divisions {
        println!(
            "- {}: {:.1}% across {} outlets ({})",
            division.division_name,
            division.score.score.ok_percentage,
            division.outlet_count,
            division.score.score.status.label()
        );
    }
    if !report.top_failing_points.is_empty() {
        println!("Most failed checklist points:");
        for point in &report.top_failing_points {
            println!(
                "  - #{} {}: {} of {} NOT OK ({:.1}%)",
                point.checklist_point_id,
                point.question,
                point.nok_count,
                point.total_scored,
                point.nok_percentage
            );
        }
    }
}

fn render_division_report(report: &DivisionReport) {
    println!(
        "\nDivision {} ({} visits): {}",
        report.division_name,
        report.visit_count,
        describe_score(&report.score.score)
    );
    for outlet in &report.outlets {
        println!(
            "  {}. {} {}: {:.1}% ({})",
            outlet.rank,
            outlet.outlet_code,
            outlet.outlet_name,
            outlet.score.score.ok_percentage,
            outlet.score.score.status.label()
        );
    }
}

fn render_outlet_report(report: &OutletReport) {
    println!(
        "  Outlet {} {} ({} visits)",
        report.outlet_code, report.outlet_name, report.visit_count
    );
    for visit in &report.visits {
        println!(
            "    - {} visit {}: {:.1}% ({})",
            visit.visit_date,
            visit.visit_id,
            visit.score.score.ok_percentage,
            visit.score.score.status.label()
        );
    }
}
