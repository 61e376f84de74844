mod parser;

use crate::audit::domain::{ChecklistResponse, VisitId};
use crate::audit::scoring::{aggregate, ScoreResult};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ResponseImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ResponseImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseImportError::Io(err) => write!(f, "failed to read response export: {}", err),
            ResponseImportError::Csv(err) => write!(f, "invalid response CSV data: {}", err),
        }
    }
}

impl std::error::Error for ResponseImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResponseImportError::Io(err) => Some(err),
            ResponseImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ResponseImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ResponseImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Checklist responses loaded from a CSV export with the columns
/// `Visit ID, Checklist Point ID, Response, Notes, NOK Remark`.
#[derive(Debug, Clone, Default)]
pub struct ImportedResponses {
    responses: Vec<ChecklistResponse>,
}

impl ImportedResponses {
    pub fn responses(&self) -> &[ChecklistResponse] {
        &self.responses
    }

    pub fn into_responses(self) -> Vec<ChecklistResponse> {
        self.responses
    }

    pub fn overall(&self) -> ScoreResult {
        aggregate(&self.responses)
    }

    /// One score per visit, ordered by visit id.
    pub fn by_visit(&self) -> Vec<(VisitId, ScoreResult)> {
        let mut grouped: BTreeMap<VisitId, Vec<ChecklistResponse>> = BTreeMap::new();
        for response in &self.responses {
            grouped
                .entry(response.visit_id)
                .or_default()
                .push(response.clone());
        }

        grouped
            .into_iter()
            .map(|(visit_id, responses)| (visit_id, aggregate(&responses)))
            .collect()
    }
}

pub struct ChecklistResponseImporter;

impl ChecklistResponseImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ImportedResponses, ResponseImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ImportedResponses, ResponseImportError> {
        let responses = parser::parse_responses(reader)?;
        Ok(ImportedResponses { responses })
    }
}
