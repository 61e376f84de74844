/// Class of a stored checklist response once its spelling has been normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedResponse {
    Ok,
    NotOk,
    Na,
    Unknown,
}

/// Map historical response text onto the three scoring classes.
///
/// Matching is ASCII case-insensitive and ignores surrounding whitespace, so the
/// result never depends on locale. Values outside the known spellings are
/// reported as [`NormalizedResponse::Unknown`] rather than folded into N/A.
pub fn normalize(raw: &str) -> NormalizedResponse {
    let trimmed = raw.trim();
    let lowered = trimmed.to_ascii_lowercase();

    if lowered == "ok" {
        return NormalizedResponse::Ok;
    }

    if lowered.replace(' ', "_") == "not_ok" || lowered == "not ok" || trimmed == "NOT OK" {
        return NormalizedResponse::NotOk;
    }

    if matches!(lowered.as_str(), "na" | "n/a") {
        return NormalizedResponse::Na;
    }

    NormalizedResponse::Unknown
}
