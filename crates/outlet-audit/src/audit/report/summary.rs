use super::super::domain::{
    ChecklistPoint, ChecklistPointId, ChecklistResponse, DateRange, Division, DivisionId, Outlet,
    OutletId, Visit, VisitId, VisitStatus,
};
use super::super::scoring::{normalize, NormalizedResponse, ScoreStatus, ScoreTally};
use super::views::{
    CategoryScoreEntry, DashboardSummary, DivisionReport, DivisionScoreEntry, FailingPointEntry,
    NokPointEntry, OutletReport, OutletScoreEntry, RangeReport, StatusTierCount, VisitReport,
    VisitScoreEntry, VisitStatusCount,
};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

const UNCATEGORISED: &str = "Uncategorised";
const TOP_FAILING_POINTS: usize = 10;

/// Per-visit and per-point tallies over one batch of responses.
#[derive(Debug, Default)]
pub(crate) struct ResponseIndex {
    by_visit: HashMap<VisitId, ScoreTally>,
    by_point: HashMap<ChecklistPointId, ScoreTally>,
}

impl ResponseIndex {
    pub(crate) fn build(responses: &[ChecklistResponse]) -> Self {
        let mut index = Self::default();
        let mut unknown = 0usize;

        for response in responses {
            let normalized = normalize(&response.response);
            if normalized == NormalizedResponse::Unknown {
                unknown += 1;
            }
            index
                .by_visit
                .entry(response.visit_id)
                .or_default()
                .record(normalized);
            index
                .by_point
                .entry(response.checklist_point_id)
                .or_default()
                .record(normalized);
        }

        if unknown > 0 {
            warn!(
                unknown,
                total = responses.len(),
                "checklist responses with unrecognised values were excluded"
            );
        }

        index
    }

    pub(crate) fn visit_tally(&self, visit_id: VisitId) -> ScoreTally {
        self.by_visit.get(&visit_id).copied().unwrap_or_default()
    }

    pub(crate) fn tally_for<'a, I>(&self, visits: I) -> ScoreTally
    where
        I: IntoIterator<Item = &'a Visit>,
    {
        let mut tally = ScoreTally::default();
        for visit in visits {
            tally.merge(&self.visit_tally(visit.id));
        }
        tally
    }
}

fn point_lookup(points: &[ChecklistPoint]) -> HashMap<ChecklistPointId, &ChecklistPoint> {
    points.iter().map(|point| (point.id, point)).collect()
}

pub(crate) fn build_visit_report(
    visit: &Visit,
    outlet: Option<&Outlet>,
    responses: &[ChecklistResponse],
    points: &[ChecklistPoint],
) -> VisitReport {
    let points = point_lookup(points);
    let mut overall = ScoreTally::default();
    let mut categories: BTreeMap<String, ScoreTally> = BTreeMap::new();
    let mut nok_points = Vec::new();

    for response in responses.iter().filter(|r| r.visit_id == visit.id) {
        let normalized = normalize(&response.response);
        overall.record(normalized);

        let point = points.get(&response.checklist_point_id);
        let category = point
            .map(|point| point.category.clone())
            .unwrap_or_else(|| UNCATEGORISED.to_string());
        categories
            .entry(category.clone())
            .or_default()
            .record(normalized);

        if normalized == NormalizedResponse::NotOk {
            nok_points.push(NokPointEntry {
                checklist_point_id: response.checklist_point_id,
                category,
                question: point.map(|point| point.question.clone()).unwrap_or_default(),
                notes: response.notes.clone(),
                nok_remark: response.nok_remark.clone(),
            });
        }
    }

    if overall.unknown > 0 {
        warn!(
            visit_id = %visit.id,
            unknown = overall.unknown,
            "visit has checklist responses with unrecognised values"
        );
    }

    nok_points.sort_by_key(|entry| entry.checklist_point_id);

    VisitReport {
        visit_id: visit.id,
        outlet_id: visit.outlet_id,
        outlet_name: outlet.map(|outlet| outlet.name.clone()),
        auditor_id: visit.auditor_id,
        visit_date: visit.visit_date,
        visit_status: visit.status,
        visit_status_label: visit.status.label(),
        score: overall.finish().into(),
        categories: categories
            .into_iter()
            .map(|(category, tally)| CategoryScoreEntry {
                category,
                score: tally.finish().into(),
            })
            .collect(),
        nok_points,
    }
}

pub(crate) fn build_outlet_report(
    outlet: &Outlet,
    range: DateRange,
    visits: &[&Visit],
    index: &ResponseIndex,
) -> OutletReport {
    let mut ordered: Vec<&Visit> = visits.to_vec();
    ordered.sort_by_key(|visit| (visit.visit_date, visit.id));

    let entries = ordered
        .iter()
        .map(|visit| VisitScoreEntry {
            visit_id: visit.id,
            visit_date: visit.visit_date,
            auditor_id: visit.auditor_id,
            score: index.visit_tally(visit.id).finish().into(),
        })
        .collect();

    OutletReport {
        outlet_id: outlet.id,
        outlet_code: outlet.code.clone(),
        outlet_name: outlet.name.clone(),
        division_id: outlet.division_id,
        range,
        visit_count: ordered.len(),
        score: index.tally_for(ordered.iter().copied()).finish().into(),
        visits: entries,
    }
}

/// One row per outlet that has at least one visit, best OK percentage first.
fn rank_outlets(
    outlets: &HashMap<OutletId, Outlet>,
    visits: &[&Visit],
    index: &ResponseIndex,
) -> Vec<OutletScoreEntry> {
    let mut per_outlet: BTreeMap<OutletId, (usize, ScoreTally)> = BTreeMap::new();
    for visit in visits {
        let (count, tally) = per_outlet.entry(visit.outlet_id).or_default();
        *count += 1;
        tally.merge(&index.visit_tally(visit.id));
    }

    let mut rows: Vec<OutletScoreEntry> = per_outlet
        .into_iter()
        .map(|(outlet_id, (visit_count, tally))| {
            let outlet = outlets.get(&outlet_id);
            OutletScoreEntry {
                rank: 0,
                outlet_id,
                outlet_code: outlet.map(|o| o.code.clone()).unwrap_or_default(),
                outlet_name: outlet.map(|o| o.name.clone()).unwrap_or_default(),
                visit_count,
                score: tally.finish().into(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.score
            .score
            .ok_percentage
            .total_cmp(&a.score.score.ok_percentage)
            .then(a.outlet_id.cmp(&b.outlet_id))
    });
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position + 1;
    }

    rows
}

pub(crate) fn build_division_report(
    division: &Division,
    range: DateRange,
    outlets: &HashMap<OutletId, Outlet>,
    visits: &[&Visit],
    index: &ResponseIndex,
) -> DivisionReport {
    DivisionReport {
        division_id: division.id,
        division_name: division.name.clone(),
        range,
        visit_count: visits.len(),
        score: index.tally_for(visits.iter().copied()).finish().into(),
        outlets: rank_outlets(outlets, visits, index),
    }
}

pub(crate) fn build_range_report(
    range: DateRange,
    divisions: &[Division],
    outlets: &HashMap<OutletId, Outlet>,
    visits: &[&Visit],
    index: &ResponseIndex,
    points: &[ChecklistPoint],
) -> RangeReport {
    let mut per_division: BTreeMap<DivisionId, Vec<&Visit>> = BTreeMap::new();
    for visit in visits {
        if let Some(outlet) = outlets.get(&visit.outlet_id) {
            per_division.entry(outlet.division_id).or_default().push(visit);
        }
    }

    let division_rows = per_division
        .into_iter()
        .map(|(division_id, division_visits)| {
            let mut outlet_ids: Vec<OutletId> =
                division_visits.iter().map(|visit| visit.outlet_id).collect();
            outlet_ids.sort();
            outlet_ids.dedup();

            DivisionScoreEntry {
                division_id,
                division_name: divisions
                    .iter()
                    .find(|division| division.id == division_id)
                    .map(|division| division.name.clone())
                    .unwrap_or_default(),
                outlet_count: outlet_ids.len(),
                visit_count: division_visits.len(),
                score: index.tally_for(division_visits).finish().into(),
            }
        })
        .collect();

    RangeReport {
        range,
        visit_count: visits.len(),
        score: index.tally_for(visits.iter().copied()).finish().into(),
        divisions: division_rows,
        top_failing_points: failing_points(index, points),
    }
}

fn failing_points(index: &ResponseIndex, points: &[ChecklistPoint]) -> Vec<FailingPointEntry> {
    let points = point_lookup(points);
    let mut rows: Vec<FailingPointEntry> = index
        .by_point
        .iter()
        .filter(|(_, tally)| tally.not_ok > 0)
        .map(|(point_id, tally)| {
            let result = tally.finish();
            let point = points.get(point_id);
            FailingPointEntry {
                checklist_point_id: *point_id,
                category: point
                    .map(|point| point.category.clone())
                    .unwrap_or_else(|| UNCATEGORISED.to_string()),
                question: point.map(|point| point.question.clone()).unwrap_or_default(),
                nok_count: result.not_ok_count,
                total_scored: result.total_scored,
                nok_percentage: result.nok_percentage,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.nok_count
            .cmp(&a.nok_count)
            .then(a.checklist_point_id.cmp(&b.checklist_point_id))
    });
    rows.truncate(TOP_FAILING_POINTS);
    rows
}

pub(crate) fn build_dashboard(
    range: DateRange,
    visits: &[&Visit],
    index: &ResponseIndex,
) -> DashboardSummary {
    let visits_by_status = VisitStatus::ordered()
        .into_iter()
        .map(|status| VisitStatusCount {
            status,
            label: status.label(),
            count: visits.iter().filter(|visit| visit.status == status).count(),
        })
        .collect();

    let completed: Vec<&Visit> = visits
        .iter()
        .copied()
        .filter(|visit| visit.status.counts_toward_reports())
        .collect();

    let mut per_outlet: HashMap<OutletId, ScoreTally> = HashMap::new();
    for visit in &completed {
        per_outlet
            .entry(visit.outlet_id)
            .or_default()
            .merge(&index.visit_tally(visit.id));
    }

    let mut tiers: HashMap<ScoreStatus, usize> = HashMap::new();
    for tally in per_outlet.values() {
        *tiers.entry(tally.finish().status).or_default() += 1;
    }

    let outlets_by_status = ScoreStatus::ordered()
        .into_iter()
        .map(|status| StatusTierCount {
            status,
            status_color: status.color(),
            outlets: tiers.get(&status).copied().unwrap_or(0),
        })
        .collect();

    DashboardSummary {
        range,
        visits_by_status,
        completed_score: index.tally_for(completed).finish().into(),
        outlets_by_status,
    }
}
