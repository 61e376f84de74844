use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier wrapper for audit visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(pub u64);

/// Identifier wrapper for retail outlets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutletId(pub u64);

/// Identifier wrapper for divisions grouping outlets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DivisionId(pub u64);

/// Identifier wrapper for checklist points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistPointId(pub u64);

/// Identifier wrapper for dashboard users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

macro_rules! display_id {
    ($($name:ident),*) => {
        $(impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_id!(VisitId, OutletId, DivisionId, ChecklistPointId, UserId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Scheduled,
            Self::InProgress,
            Self::Completed,
            Self::Cancelled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Only completed visits feed reporting aggregates.
    pub const fn counts_toward_reports(self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Supervisor,
    Auditor,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Supervisor => "Supervisor",
            Self::Auditor => "Auditor",
        }
    }
}

/// Authenticated identity resolved from a bearer token before any report runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub division_id: Option<DivisionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlet {
    pub id: OutletId,
    pub code: String,
    pub name: String,
    pub division_id: DivisionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistPoint {
    pub id: ChecklistPointId,
    pub category: String,
    pub question: String,
}

/// One audit of one outlet by one user on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub outlet_id: OutletId,
    pub auditor_id: UserId,
    pub visit_date: NaiveDate,
    pub status: VisitStatus,
}

/// Stored answer to a checklist point. `response` keeps the raw text as persisted,
/// which for historical rows may use any casing or spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResponse {
    pub visit_id: VisitId,
    pub checklist_point_id: ChecklistPointId,
    pub response: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub nok_remark: Option<String>,
}

/// Constrained answer accepted on write. Only the canonical spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistAnswer {
    Ok,
    NotOk,
    NotApplicable,
}

impl ChecklistAnswer {
    /// Text persisted for the answer.
    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "NOT OK",
            Self::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for ChecklistAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_stored())
    }
}

impl FromStr for ChecklistAnswer {
    type Err = InvalidAnswer;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OK" => Ok(Self::Ok),
            "NOT OK" => Ok(Self::NotOk),
            "N/A" => Ok(Self::NotApplicable),
            other => Err(InvalidAnswer(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid checklist answer (expected OK, NOT OK or N/A)")]
pub struct InvalidAnswer(pub String);

/// Inclusive date window applied to visit dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, InvalidDateRange> {
        match (from, to) {
            (Some(from), Some(to)) if from > to => Err(InvalidDateRange { from, to }),
            _ => Ok(Self { from, to }),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Parse a `YYYY-MM-DD` date, tolerating surrounding whitespace.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("date range start {from} is after end {to}")]
pub struct InvalidDateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_date(" 2025-03-04 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 4).expect("valid"))
        );
        let err = parse_date("March").expect_err("month name rejected");
        assert!(err.contains("'March'"), "{err}");
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn strict_answers_only_accept_canonical_spellings() {
        assert_eq!("OK".parse::<ChecklistAnswer>(), Ok(ChecklistAnswer::Ok));
        assert_eq!("NOT OK".parse::<ChecklistAnswer>(), Ok(ChecklistAnswer::NotOk));
        assert_eq!(
            "N/A".parse::<ChecklistAnswer>(),
            Ok(ChecklistAnswer::NotApplicable)
        );
        assert!("ok".parse::<ChecklistAnswer>().is_err());
        assert!("not_ok".parse::<ChecklistAnswer>().is_err());
        assert!("NA".parse::<ChecklistAnswer>().is_err());
    }

    #[test]
    fn date_range_is_inclusive_and_rejects_inverted_bounds() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid");
        let to = NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid");
        let range = DateRange::new(Some(from), Some(to)).expect("ordered range");
        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(to.succ_opt().expect("valid")));

        assert!(DateRange::new(Some(to), Some(from)).is_err());
        assert!(DateRange::unbounded().contains(from));
    }
}
