use outlet_audit::audit::scoring::{aggregate_raw, classify, normalize, NormalizedResponse};
use outlet_audit::audit::{
    aggregate, ChecklistPointId, ChecklistResponse, ScoreResult, ScoreStatus, VisitId,
};

fn samples() -> Vec<Vec<&'static str>> {
    vec![
        vec![],
        vec!["OK"],
        vec!["NA", "N/A"],
        vec!["OK", "OK", "OK", "NOT OK", "NA"],
        vec!["ok", "not_ok", "Not Ok", "n/a", "???", "OK", "", "na"],
        vec!["NOT OK"; 7],
    ]
}

fn permutations(raw: &[&'static str]) -> Vec<Vec<&'static str>> {
    let mut variants = vec![raw.to_vec()];
    let mut reversed = raw.to_vec();
    reversed.reverse();
    variants.push(reversed);
    for shift in 1..raw.len() {
        let mut rotated = raw.to_vec();
        rotated.rotate_left(shift);
        variants.push(rotated);
    }
    let mut sorted = raw.to_vec();
    sorted.sort();
    variants.push(sorted);
    variants
}

#[test]
fn normalization_covers_documented_spellings() {
    for raw in ["OK", "ok", "Ok"] {
        assert_eq!(normalize(raw), NormalizedResponse::Ok);
    }
    for raw in ["NOT OK", "not_ok", "not ok", "NOT_OK"] {
        assert_eq!(normalize(raw), NormalizedResponse::NotOk);
    }
    for raw in ["NA", "na", "N/A"] {
        assert_eq!(normalize(raw), NormalizedResponse::Na);
    }
}

#[test]
fn aggregation_is_order_independent() {
    for sample in samples() {
        let expected = aggregate_raw(sample.iter().copied());
        for variant in permutations(&sample) {
            assert_eq!(aggregate_raw(variant.iter().copied()), expected, "{variant:?}");
        }
    }
}

#[test]
fn every_response_lands_in_exactly_one_bucket() {
    for sample in samples() {
        let result = aggregate_raw(sample.iter().copied());
        let counted = result.ok_count + result.not_ok_count + result.na_count + result.unknown_count;
        assert_eq!(counted, sample.len() as u64, "{sample:?}");
        assert_eq!(result.total_scored, result.ok_count + result.not_ok_count);
    }
}

#[test]
fn aggregation_is_idempotent() {
    let raw = ["OK", "NOT OK", "NA", "junk"];
    assert_eq!(aggregate_raw(raw), aggregate_raw(raw));
}

#[test]
fn empty_set_yields_zero_result() {
    let result = aggregate(&[]);
    assert_eq!(result, ScoreResult::default());
    assert_eq!(result.ok_percentage, 0.0);
    assert_eq!(result.nok_percentage, 0.0);
    assert_eq!(result.status, ScoreStatus::Critical);
}

#[test]
fn stored_responses_score_like_raw_values() {
    let responses: Vec<ChecklistResponse> = ["OK", "OK", "OK", "NOT OK", "NA"]
        .iter()
        .enumerate()
        .map(|(index, raw)| ChecklistResponse {
            visit_id: VisitId(1),
            checklist_point_id: ChecklistPointId(index as u64 + 1),
            response: raw.to_string(),
            notes: None,
            nok_remark: None,
        })
        .collect();

    let result = aggregate(&responses);
    assert_eq!(result.ok_count, 3);
    assert_eq!(result.not_ok_count, 1);
    assert_eq!(result.na_count, 1);
    assert_eq!(result.total_scored, 4);
    assert_eq!(result.ok_percentage, 75.0);
    assert_eq!(result.nok_percentage, 25.0);
    assert_eq!(result.status, ScoreStatus::Warning);
}

#[test]
fn seventeen_of_twenty_is_good() {
    let mut raw = vec!["OK"; 17];
    raw.extend(vec!["NOT OK"; 3]);
    raw.extend(vec!["N/A"; 5]);
    let result = aggregate_raw(raw);
    assert_eq!(result.ok_percentage, 85.0);
    assert_eq!(result.status, ScoreStatus::Good);
}

#[test]
fn classification_boundaries() {
    assert_eq!(classify(84.9), ScoreStatus::Warning);
    assert_eq!(classify(85.0), ScoreStatus::Good);
    assert_eq!(classify(69.9), ScoreStatus::Critical);
    assert_eq!(classify(70.0), ScoreStatus::Warning);
}
