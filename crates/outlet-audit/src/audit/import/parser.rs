use crate::audit::domain::{ChecklistPointId, ChecklistResponse, VisitId};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_responses<R: Read>(reader: R) -> Result<Vec<ChecklistResponse>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut responses = Vec::new();

    for record in csv_reader.deserialize::<ResponseRow>() {
        let row = record?;
        responses.push(ChecklistResponse {
            visit_id: VisitId(row.visit_id),
            checklist_point_id: ChecklistPointId(row.checklist_point_id),
            response: row.response,
            notes: row.notes,
            nok_remark: row.nok_remark,
        });
    }

    Ok(responses)
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    #[serde(rename = "Visit ID")]
    visit_id: u64,
    #[serde(rename = "Checklist Point ID")]
    checklist_point_id: u64,
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
    #[serde(
        rename = "NOK Remark",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    nok_remark: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
