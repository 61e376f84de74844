use super::normalizer::{normalize, NormalizedResponse};
use super::status::{classify, ScoreStatus};
use crate::audit::domain::ChecklistResponse;
use serde::Serialize;
use tracing::{debug, warn};

/// Running counts of normalized responses. Tallies merge, so per-visit counts
/// can be rolled up into outlet or division totals without rescanning.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTally {
    pub ok: u64,
    pub not_ok: u64,
    pub na: u64,
    pub unknown: u64,
}

impl ScoreTally {
    pub fn record(&mut self, response: NormalizedResponse) {
        match response {
            NormalizedResponse::Ok => self.ok += 1,
            NormalizedResponse::NotOk => self.not_ok += 1,
            NormalizedResponse::Na => self.na += 1,
            NormalizedResponse::Unknown => self.unknown += 1,
        }
    }

    pub fn record_raw(&mut self, raw: &str) {
        let normalized = normalize(raw);
        if normalized == NormalizedResponse::Unknown {
            debug!(raw, "unrecognised checklist response excluded from scoring");
        }
        self.record(normalized);
    }

    pub fn merge(&mut self, other: &ScoreTally) {
        self.ok += other.ok;
        self.not_ok += other.not_ok;
        self.na += other.na;
        self.unknown += other.unknown;
    }

    pub fn total(&self) -> u64 {
        self.ok + self.not_ok + self.na + self.unknown
    }

    pub fn total_scored(&self) -> u64 {
        self.ok + self.not_ok
    }

    pub fn finish(&self) -> ScoreResult {
        let total_scored = self.total_scored();
        let ok_percentage = percentage(self.ok, total_scored);
        let nok_percentage = percentage(self.not_ok, total_scored);

        ScoreResult {
            ok_count: self.ok,
            not_ok_count: self.not_ok,
            na_count: self.na,
            unknown_count: self.unknown,
            total_scored,
            ok_percentage,
            nok_percentage,
            status: classify(ok_percentage),
        }
    }
}

/// Derived score for a set of responses. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub ok_count: u64,
    #[serde(rename = "nok_count")]
    pub not_ok_count: u64,
    pub na_count: u64,
    pub unknown_count: u64,
    pub total_scored: u64,
    pub ok_percentage: f64,
    pub nok_percentage: f64,
    pub status: ScoreStatus,
}

impl Default for ScoreResult {
    fn default() -> Self {
        ScoreTally::default().finish()
    }
}

/// Score a set of stored responses.
pub fn aggregate(responses: &[ChecklistResponse]) -> ScoreResult {
    aggregate_raw(responses.iter().map(|response| response.response.as_str()))
}

/// Score raw response strings, in any order.
pub fn aggregate_raw<'a, I>(responses: I) -> ScoreResult
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tally = ScoreTally::default();
    for raw in responses {
        tally.record_raw(raw);
    }

    if tally.unknown > 0 {
        warn!(
            unknown = tally.unknown,
            total = tally.total(),
            "checklist responses with unrecognised values were excluded"
        );
    }

    tally.finish()
}

/// Share of `part` in `total` as a percentage rounded half-up to one decimal.
/// Zero when nothing was scored.
pub(crate) fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let part = u128::from(part);
    let total = u128::from(total);
    let tenths = (part * 2000 + total) / (2 * total);
    tenths as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_scores_zero() {
        let result = aggregate_raw(Vec::<&str>::new());
        assert_eq!(result.ok_count, 0);
        assert_eq!(result.not_ok_count, 0);
        assert_eq!(result.na_count, 0);
        assert_eq!(result.unknown_count, 0);
        assert_eq!(result.ok_percentage, 0.0);
        assert_eq!(result.nok_percentage, 0.0);
        assert_eq!(result.status, ScoreStatus::Critical);
        assert_eq!(result, ScoreResult::default());
    }

    #[test]
    fn mixed_responses_exclude_na_from_percentages() {
        let result = aggregate_raw(["OK", "ok", "Ok", "NOT OK", "NA"]);
        assert_eq!(result.ok_count, 3);
        assert_eq!(result.not_ok_count, 1);
        assert_eq!(result.na_count, 1);
        assert_eq!(result.total_scored, 4);
        assert_eq!(result.ok_percentage, 75.0);
        assert_eq!(result.nok_percentage, 25.0);
        assert_eq!(result.status, ScoreStatus::Warning);
    }

    #[test]
    fn only_not_applicable_is_zero_not_nan() {
        let result = aggregate_raw(["NA", "N/A"]);
        assert_eq!(result.ok_percentage, 0.0);
        assert_eq!(result.nok_percentage, 0.0);
        assert_eq!(result.status, ScoreStatus::Critical);
    }

    #[test]
    fn seventeen_of_twenty_lands_on_good_boundary() {
        let mut raw = vec!["OK"; 17];
        raw.extend(["NOT OK"; 3]);
        raw.extend(["NA"; 4]);
        let result = aggregate_raw(raw);
        assert_eq!(result.total_scored, 20);
        assert_eq!(result.ok_percentage, 85.0);
        assert_eq!(result.nok_percentage, 15.0);
        assert_eq!(result.status, ScoreStatus::Good);
    }

    #[test]
    fn unknown_values_are_counted_but_not_scored() {
        let result = aggregate_raw(["OK", "garbage", "NOT OK", ""]);
        assert_eq!(result.unknown_count, 2);
        assert_eq!(result.total_scored, 2);
        assert_eq!(result.ok_percentage, 50.0);
    }

    #[test]
    fn percentage_rounds_half_up_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        // 1/16 = 6.25% -> 6.3
        assert_eq!(percentage(1, 16), 6.3);
        // 1/8 = 12.5% stays exact
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(5, 5), 100.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn merged_tallies_match_single_pass() {
        let mut first = ScoreTally::default();
        for raw in ["OK", "NOT OK", "NA"] {
            first.record_raw(raw);
        }
        let mut second = ScoreTally::default();
        for raw in ["ok", "ok", "bogus"] {
            second.record_raw(raw);
        }
        first.merge(&second);

        let combined = aggregate_raw(["OK", "NOT OK", "NA", "ok", "ok", "bogus"]);
        assert_eq!(first.finish(), combined);
    }

    #[test]
    fn serializes_canonical_nok_count_field() {
        let value = serde_json::to_value(aggregate_raw(["OK", "NOT OK"])).expect("serializes");
        assert_eq!(value["nok_count"], 1);
        assert!(value.get("not_ok_count").is_none());
        assert_eq!(value["status"], "Critical");
    }
}
